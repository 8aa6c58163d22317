//! Small independent builders for the keyword groups, the publication date and the body.
//!
//! Each builder escapes the free text it receives exactly once and returns ready-to-embed
//! elements, one per entry, in input order.

use super::*;

/// Splits a comma-joined keyword string into trimmed, non-empty terms.
///
/// ```
/// use jatsmith::sections::keyword_terms;
///
/// assert_eq!(keyword_terms("a, b,,c "), vec!["a", "b", "c"]);
/// assert!(keyword_terms(" , ").is_empty());
/// ```
pub fn keyword_terms(raw: &str) -> Vec<&str> {
  raw.split(',').map(str::trim).filter(|term| !term.is_empty()).collect()
}

/// Builds one `<kwd>` element per keyword term.
pub fn keywords(raw: &str) -> Vec<String> {
  keyword_terms(raw).into_iter().map(|term| format!("<kwd>{}</kwd>", escape_xml(term))).collect()
}

/// Publication date broken into its JATS parts.
///
/// No calendar validation happens: the parts are slices of the input, used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubDate {
  /// Day of month, when known
  pub day:   Option<String>,
  /// Month, when known
  pub month: Option<String>,
  /// Year, always present
  pub year:  String,
}

/// Character-based slice that never panics on short or multi-byte input.
fn char_slice(s: &str, start: usize, len: usize) -> String { s.chars().skip(start).take(len).collect() }

impl PubDate {
  /// Decomposes `YYYY-MM-DD` into year (chars 0-3), month (5-6) and day (8-9).
  ///
  /// Only the first ten characters are looked at, so a full timestamp works too. Parts that come
  /// out empty (a date shorter than ten characters) are dropped.
  ///
  /// ```
  /// use jatsmith::sections::PubDate;
  ///
  /// let date = PubDate::from_iso("2023-05-17T10:00:00Z");
  /// assert_eq!(date.year, "2023");
  /// assert_eq!(date.month.as_deref(), Some("05"));
  /// assert_eq!(date.day.as_deref(), Some("17"));
  /// ```
  pub fn from_iso(date: &str) -> Self {
    let date = char_slice(date, 0, 10);
    let part = |start, len| Some(char_slice(&date, start, len)).filter(|p| !p.is_empty());
    Self { day: part(8, 2), month: part(5, 2), year: char_slice(&date, 0, 4) }
  }

  /// Year-only date.
  pub fn year_only(year: impl Into<String>) -> Self {
    Self { day: None, month: None, year: year.into() }
  }

  /// Picks the date for `metadata`.
  ///
  /// Uses `date_published` when set; otherwise the `year` field, and if that is empty too,
  /// `current_year`.
  pub fn from_metadata(metadata: &Metadata, current_year: i32) -> Self {
    if !metadata.date_published.is_empty() {
      return Self::from_iso(&metadata.date_published);
    }
    if metadata.year.is_empty() {
      trace!(current_year, "No date or year given, falling back to the current year");
      Self::year_only(current_year.to_string())
    } else {
      Self::year_only(metadata.year.clone())
    }
  }

  /// The `<day>`, `<month>` and `<year>` elements, in the order JATS expects.
  pub fn elements(&self) -> Vec<String> {
    let mut elements = Vec::with_capacity(3);
    if let Some(day) = &self.day {
      elements.push(format!("<day>{}</day>", escape_xml(day)));
    }
    if let Some(month) = &self.month {
      elements.push(format!("<month>{}</month>", escape_xml(month)));
    }
    elements.push(format!("<year>{}</year>", escape_xml(&self.year)));
    elements
  }
}

lazy_static! {
  /// One or more consecutive newlines separate paragraphs.
  static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n+").unwrap();
}

/// Splits body text into `<p>` elements on runs of newlines.
///
/// Chunks are kept as they are: internal whitespace is not trimmed and an empty chunk (from a
/// leading or trailing newline, or an empty body) still becomes an empty paragraph.
///
/// ```
/// use jatsmith::sections::paragraphs;
///
/// assert_eq!(paragraphs("One.\n\n\nTwo & three."), vec!["<p>One.</p>", "<p>Two &amp; three.</p>"]);
/// assert_eq!(paragraphs(""), vec!["<p></p>"]);
/// ```
pub fn paragraphs(body: &str) -> Vec<String> {
  PARAGRAPH_BREAK.split(body).map(|chunk| format!("<p>{}</p>", escape_xml(chunk))).collect()
}
