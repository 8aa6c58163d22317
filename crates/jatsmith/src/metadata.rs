//! The bibliographic record fed to the serializer, and the merge of model suggestions onto it.
//!
//! Field names serialize in camelCase (`titleEn`, `datePublished`, ...) so a record can be read
//! straight from the JSON or TOML files an editor fills in.
//!
//! # Examples
//!
//! ```
//! use jatsmith::metadata::{Metadata, Suggestion};
//!
//! let defaults = Metadata::blank("2024");
//! let suggestion: Suggestion =
//!   serde_json::from_str(r#"{"title": "Aguas profundas", "year": "1999"}"#).unwrap();
//!
//! let merged = suggestion.merge_onto(defaults);
//! assert_eq!(merged.title, "Aguas profundas");
//! // An existing year is kept over the suggested one
//! assert_eq!(merged.year, "2024");
//! ```

use super::*;

/// A complete article record.
///
/// Every free-text field may be empty. `authors` must hold at least one entry (possibly blank);
/// its order decides the displayed author order and the affiliation numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
  /// Title in the article's primary language
  pub title:          String,
  /// English translation of the title
  pub title_en:       String,
  /// Journal title
  pub journal:        String,
  /// Electronic ISSN
  pub issn:           String,
  /// Volume number
  pub volume:         String,
  /// Issue number
  pub issue:          String,
  /// Publication year, used when `date_published` is empty
  pub year:           String,
  /// Digital Object Identifier, without the resolver prefix
  pub doi:            String,
  /// ISO 8601 publication date (`YYYY-MM-DD`) or empty
  pub date_published: String,
  /// Abstract in the primary language
  #[serde(rename = "abstract")]
  pub abstract_text:  String,
  /// English abstract
  #[serde(rename = "abstractEn")]
  pub abstract_en:    String,
  /// Comma-separated keywords in the primary language
  pub keywords:       String,
  /// Comma-separated English keywords
  pub keywords_en:    String,
  /// Ordered list of authors
  pub authors:        Vec<Author>,
}

/// A single author as typed by an editor.
///
/// `name` holds given names and surname together. Where the boundary between them matters (e.g.
/// "Juan de la Cruz"), `surname` and `given_names` can be set explicitly and take precedence over
/// splitting `name`.
///
/// ```
/// use jatsmith::metadata::Author;
///
/// let author = Author {
///   name: "Juan de la Cruz".to_string(),
///   surname: Some("de la Cruz".to_string()),
///   given_names: Some("Juan".to_string()),
///   ..Author::default()
/// };
/// assert!(author.has_explicit_name());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
  /// Full name, given names first
  pub name:        String,
  /// Institution
  pub affiliation: String,
  /// Contact email
  pub email:       String,
  /// ORCID as a bare id or a full URL
  pub orcid:       String,
  /// Country of the affiliation, free text
  pub country:     String,
  /// Explicit surname, overriding the split of `name`
  #[serde(skip_serializing_if = "Option::is_none")]
  pub surname:     Option<String>,
  /// Explicit given names, overriding the split of `name`
  #[serde(skip_serializing_if = "Option::is_none")]
  pub given_names: Option<String>,
}

impl Author {
  /// Whether the author carries an explicit surname/given-names pair.
  pub fn has_explicit_name(&self) -> bool { self.surname.is_some() || self.given_names.is_some() }
}

impl Metadata {
  /// Default record: one blank author and the given publication year.
  pub fn blank(year: impl Into<String>) -> Self {
    Self { year: year.into(), authors: vec![Author::default()], ..Self::default() }
  }

  /// Default record stamped with the current calendar year.
  pub fn for_current_year() -> Self {
    use chrono::Datelike;
    Self::blank(chrono::Local::now().year().to_string())
  }

  /// Reads a record from a JSON file, or TOML when the extension is `.toml`.
  ///
  /// Fields missing from the file keep their empty defaults.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!("Loading metadata from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
      Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(toml::from_str(&content)?),
      _ => Ok(serde_json::from_str(&content)?),
    }
  }

  /// Checks the caller-side contract before the record is serialized.
  ///
  /// # Errors
  ///
  /// Returns [`JatsError::InvalidMetadata`] when the author list is empty.
  pub fn validate(&self) -> Result<()> {
    if self.authors.is_empty() {
      return Err(JatsError::InvalidMetadata("at least one author is required".to_string()));
    }
    Ok(())
  }

  /// Names of the fields an editor is expected to fill before generating.
  ///
  /// The serializer emits these even when empty, so a non-empty result here is a hint for the
  /// caller, not an error.
  pub fn missing_required(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.title.trim().is_empty() {
      missing.push("title");
    }
    if self.journal.trim().is_empty() {
      missing.push("journal");
    }
    if self.abstract_text.trim().is_empty() {
      missing.push("abstract");
    }
    if self.authors.iter().any(|a| a.name.trim().is_empty()) {
      missing.push("author name");
    }
    if self.authors.iter().any(|a| a.affiliation.trim().is_empty()) {
      missing.push("author affiliation");
    }
    missing
  }
}

/// A best-effort, possibly partial record proposed by a metadata suggester.
///
/// Every field is optional. Unknown fields are ignored so that chatty model output still parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Suggestion {
  /// Suggested title
  pub title:          Option<String>,
  /// Suggested English title
  pub title_en:       Option<String>,
  /// Suggested journal
  pub journal:        Option<String>,
  /// Suggested ISSN
  pub issn:           Option<String>,
  /// Suggested volume
  pub volume:         Option<String>,
  /// Suggested issue
  pub issue:          Option<String>,
  /// Suggested year
  pub year:           Option<String>,
  /// Suggested DOI
  pub doi:            Option<String>,
  /// Suggested publication date
  pub date_published: Option<String>,
  /// Suggested abstract
  #[serde(rename = "abstract")]
  pub abstract_text:  Option<String>,
  /// Suggested English abstract
  #[serde(rename = "abstractEn")]
  pub abstract_en:    Option<String>,
  /// Suggested keywords
  pub keywords:       Option<String>,
  /// Suggested English keywords
  pub keywords_en:    Option<String>,
  /// Suggested authors
  pub authors:        Option<Vec<SuggestedAuthor>>,
}

/// An author as proposed by a suggester; missing fields become empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestedAuthor {
  /// Full name
  pub name:        Option<String>,
  /// Institution
  pub affiliation: Option<String>,
  /// Contact email
  pub email:       Option<String>,
  /// ORCID
  pub orcid:       Option<String>,
  /// Country
  pub country:     Option<String>,
}

impl From<SuggestedAuthor> for Author {
  fn from(author: SuggestedAuthor) -> Self {
    Self {
      name:        author.name.unwrap_or_default(),
      affiliation: author.affiliation.unwrap_or_default(),
      email:       author.email.unwrap_or_default(),
      orcid:       author.orcid.unwrap_or_default(),
      country:     author.country.unwrap_or_default(),
      surname:     None,
      given_names: None,
    }
  }
}

/// Picks the suggested value when it has content, else keeps the current one.
fn overlay(current: String, suggested: Option<String>) -> String {
  match suggested {
    Some(value) if !value.trim().is_empty() => value,
    _ => current,
  }
}

impl Suggestion {
  /// Overlays this suggestion onto `defaults`, field by field.
  ///
  /// | field | winner |
  /// |---|---|
  /// | `year` | `defaults` when non-empty, else the suggestion |
  /// | `authors` | the suggestion when present and non-empty, else `defaults` |
  /// | any other field | the suggestion when present and non-blank, else `defaults` |
  ///
  /// The result always keeps at least one author when `defaults` had one.
  pub fn merge_onto(self, defaults: Metadata) -> Metadata {
    let year = if defaults.year.trim().is_empty() {
      overlay(defaults.year, self.year)
    } else {
      defaults.year
    };

    let authors = match self.authors {
      Some(authors) if !authors.is_empty() => authors.into_iter().map(Author::from).collect(),
      _ => defaults.authors,
    };

    Metadata {
      title: overlay(defaults.title, self.title),
      title_en: overlay(defaults.title_en, self.title_en),
      journal: overlay(defaults.journal, self.journal),
      issn: overlay(defaults.issn, self.issn),
      volume: overlay(defaults.volume, self.volume),
      issue: overlay(defaults.issue, self.issue),
      year,
      doi: overlay(defaults.doi, self.doi),
      date_published: overlay(defaults.date_published, self.date_published),
      abstract_text: overlay(defaults.abstract_text, self.abstract_text),
      abstract_en: overlay(defaults.abstract_en, self.abstract_en),
      keywords: overlay(defaults.keywords, self.keywords),
      keywords_en: overlay(defaults.keywords_en, self.keywords_en),
      authors,
    }
  }
}
