//! Assembly of the final JATS/SPS document.
//!
//! [`JatsWriter::write`] is a pure, total function: for any [`Metadata`] and body text it returns
//! one XML document, byte-identical across calls for the same input. Optional fields follow a
//! single rule: their element is emitted only when the source field is non-empty, never as an
//! empty placeholder. The exceptions are
//! - a missing DOI, replaced by a comment so the editor sees where it goes, and
//! - the title, journal, abstract and author name/affiliation blocks, which are always present.
//!
//! The XML declaration, DOCTYPE and root attributes are constants; the stand-in content (journal
//! id, publisher, page range, license, the placeholder reference) comes from [`Boilerplate`].
//!
//! ```
//! use jatsmith::{document::JatsWriter, metadata::Metadata};
//!
//! let mut metadata = Metadata::blank("2024");
//! metadata.title_en = "Foo".to_string();
//!
//! let xml = JatsWriter::new().write(&metadata, "");
//! assert_eq!(xml.matches("<trans-title-group").count(), 1);
//! assert!(xml.contains("<trans-title>Foo</trans-title>"));
//! ```

use super::*;
use crate::{
  config::{Boilerplate, Config},
  contrib::{link_authors_with, LastTokenSurname, NameSplitter},
  country::CountryResolver,
  sections::{keywords, paragraphs, PubDate},
};

/// Suggested file name for the produced artifact.
pub const ARTIFACT_FILE_NAME: &str = "article_JATS_SPS.xml";

/// Media type of the produced artifact.
pub const CONTENT_TYPE: &str = "application/xml;charset=utf-8";

/// XML declaration.
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// JATS 1.1 publishing DTD.
const DOCTYPE: &str = r#"<!DOCTYPE article PUBLIC "-//NLM//DTD JATS (Z39.96) Journal Publishing DTD v1.1 20151215//EN" "https://jats.nlm.nih.gov/publishing/1.1/JATS-journalpublishing1.dtd">"#;

/// Root element with the SPS version, article type, base language and namespaces.
const ARTICLE_OPEN: &str = r#"<article xmlns:mml="http://www.w3.org/1998/Math/MathML" xmlns:xlink="http://www.w3.org/1999/xlink" article-type="research-article" dtd-version="1.1" specific-use="sps-1.9" xml:lang="es">"#;

/// Language of the translated blocks.
const TRANSLATION_LANG: &str = "en";

/// Indented line buffer.
struct Lines {
  /// The document so far
  out:   String,
  /// Current nesting depth
  depth: usize,
}

impl Lines {
  /// Empty buffer at depth zero.
  fn new() -> Self { Self { out: String::with_capacity(4096), depth: 0 } }

  /// Appends `line` at the current depth.
  fn line(&mut self, line: impl AsRef<str>) {
    for _ in 0..self.depth {
      self.out.push_str("  ");
    }
    self.out.push_str(line.as_ref());
    self.out.push('\n');
  }

  /// Appends every line in `lines` at the current depth.
  fn lines(&mut self, lines: impl IntoIterator<Item = String>) {
    lines.into_iter().for_each(|line| self.line(line));
  }

  /// Opens an element (`tag` holds the full start tag) and nests one level.
  fn open(&mut self, tag: impl AsRef<str>) {
    self.line(tag);
    self.depth += 1;
  }

  /// Closes `name` one level up.
  fn close(&mut self, name: &str) {
    self.depth = self.depth.saturating_sub(1);
    self.line(format!("</{name}>"));
  }

  /// `<name>escaped text</name>`.
  fn text(&mut self, name: &str, text: &str) {
    self.line(format!("<{name}>{}</{name}>", escape_xml(text)));
  }

  /// Like [`Lines::text`], but nothing at all when `text` is empty.
  fn text_if_present(&mut self, name: &str, text: &str) {
    if !text.is_empty() {
      self.text(name, text);
    }
  }

  /// The finished document.
  fn finish(self) -> String { self.out }
}

/// Makes `text` safe inside `<!-- -->`.
fn comment(text: &str) -> String {
  // A single pass leaves `--` behind in runs of three or more dashes
  let mut text = text.to_string();
  while text.contains("--") {
    text = text.replace("--", "- -");
  }
  format!("<!-- {text} -->")
}

/// The document assembler.
///
/// Holds everything that is not part of the record: the boilerplate, the country table, the name
/// splitting strategy and the year used when a record has neither a date nor a year.
pub struct JatsWriter {
  /// Unconditional stand-in content
  boilerplate:  Boilerplate,
  /// Country code lookup
  countries:    CountryResolver,
  /// Name splitting strategy
  splitter:     Box<dyn NameSplitter>,
  /// Fallback publication year
  current_year: i32,
}

impl Default for JatsWriter {
  fn default() -> Self { Self::new() }
}

impl JatsWriter {
  /// Writer with the stock boilerplate, the built-in country table and last-token surnames.
  pub fn new() -> Self {
    use chrono::Datelike;
    Self {
      boilerplate:  Boilerplate::default(),
      countries:    CountryResolver::new(),
      splitter:     Box::new(LastTokenSurname),
      current_year: chrono::Local::now().year(),
    }
  }

  /// Writer configured from `config`.
  pub fn from_config(config: &Config) -> Self {
    Self::new().with_boilerplate(config.boilerplate.clone()).with_countries(config.country_resolver())
  }

  /// Replaces the boilerplate.
  pub fn with_boilerplate(mut self, boilerplate: Boilerplate) -> Self {
    self.boilerplate = boilerplate;
    self
  }

  /// Replaces the country resolver.
  pub fn with_countries(mut self, countries: CountryResolver) -> Self {
    self.countries = countries;
    self
  }

  /// Replaces the name splitting strategy.
  pub fn with_name_splitter(mut self, splitter: impl NameSplitter + 'static) -> Self {
    self.splitter = Box::new(splitter);
    self
  }

  /// Pins the year used when a record carries no date and no year.
  pub fn with_current_year(mut self, year: i32) -> Self {
    self.current_year = year;
    self
  }

  /// Serializes `metadata` and `body` into a JATS document.
  #[instrument(skip_all, fields(authors = metadata.authors.len(), body = body.len()), level = "debug")]
  pub fn write(&self, metadata: &Metadata, body: &str) -> String {
    let mut doc = Lines::new();
    doc.line(XML_DECLARATION);
    doc.line(DOCTYPE);
    doc.open(ARTICLE_OPEN);

    doc.open("<front>");
    self.journal_meta(&mut doc, metadata);
    self.article_meta(&mut doc, metadata);
    doc.close("front");

    doc.open("<body>");
    doc.lines(paragraphs(body));
    doc.close("body");

    self.back(&mut doc);
    doc.close("article");

    trace!("Assembled JATS document");
    doc.finish()
  }

  /// `<journal-meta>`.
  fn journal_meta(&self, doc: &mut Lines, metadata: &Metadata) {
    let bp = &self.boilerplate;
    doc.open("<journal-meta>");
    doc.line(format!(
      r#"<journal-id journal-id-type="publisher-id">{}</journal-id>"#,
      escape_xml(&bp.journal_id)
    ));
    doc.open("<journal-title-group>");
    doc.text("journal-title", &metadata.journal);
    doc.close("journal-title-group");
    if !metadata.issn.is_empty() {
      doc.line(format!(r#"<issn pub-type="epub">{}</issn>"#, escape_xml(&metadata.issn)));
    }
    doc.open("<publisher>");
    doc.text("publisher-name", &bp.publisher_name);
    doc.close("publisher");
    doc.close("journal-meta");
  }

  /// `<article-meta>`.
  fn article_meta(&self, doc: &mut Lines, metadata: &Metadata) {
    let bp = &self.boilerplate;
    doc.open("<article-meta>");

    if metadata.doi.is_empty() {
      doc.line(comment(&bp.doi_placeholder));
    } else {
      doc.line(format!(r#"<article-id pub-id-type="doi">{}</article-id>"#, escape_xml(&metadata.doi)));
    }

    doc.open("<article-categories>");
    doc.open(r#"<subj-group subj-group-type="heading">"#);
    doc.text("subject", &bp.subject);
    doc.close("subj-group");
    doc.close("article-categories");

    doc.open("<title-group>");
    doc.text("article-title", &metadata.title);
    if !metadata.title_en.is_empty() {
      doc.open(format!(r#"<trans-title-group xml:lang="{TRANSLATION_LANG}">"#));
      doc.text("trans-title", &metadata.title_en);
      doc.close("trans-title-group");
    }
    doc.close("title-group");

    let linked = link_authors_with(&metadata.authors, self.splitter.as_ref(), &self.countries);
    doc.open("<contrib-group>");
    for contributor in &linked.contributors {
      doc.lines(contributor.lines());
    }
    doc.close("contrib-group");
    for affiliation in &linked.affiliations {
      doc.lines(affiliation.lines());
    }

    doc.open(r#"<pub-date publication-format="electronic" date-type="pub">"#);
    doc.lines(PubDate::from_metadata(metadata, self.current_year).elements());
    doc.close("pub-date");

    doc.text_if_present("volume", &metadata.volume);
    doc.text_if_present("issue", &metadata.issue);
    doc.text("fpage", &bp.fpage);
    doc.text("lpage", &bp.lpage);

    doc.open("<permissions>");
    doc.open(format!(
      r#"<license license-type="open-access" xlink:href="{}" xml:lang="es">"#,
      escape_xml(&bp.license_url)
    ));
    doc.text("license-p", &bp.license_text);
    doc.close("license");
    doc.close("permissions");

    doc.open("<abstract>");
    doc.text("title", &bp.abstract_title);
    doc.text("p", &metadata.abstract_text);
    doc.close("abstract");
    if !metadata.abstract_en.is_empty() {
      doc.open(format!(r#"<trans-abstract xml:lang="{TRANSLATION_LANG}">"#));
      doc.text("title", &bp.abstract_en_title);
      doc.text("p", &metadata.abstract_en);
      doc.close("trans-abstract");
    }

    doc.open(r#"<kwd-group xml:lang="es">"#);
    doc.text("title", &bp.keywords_title);
    doc.lines(keywords(&metadata.keywords));
    doc.close("kwd-group");
    if !metadata.keywords_en.is_empty() {
      doc.open(format!(r#"<kwd-group xml:lang="{TRANSLATION_LANG}">"#));
      doc.text("title", &bp.keywords_en_title);
      doc.lines(keywords(&metadata.keywords_en));
      doc.close("kwd-group");
    }

    doc.close("article-meta");
  }

  /// `<back>` with the placeholder reference list.
  fn back(&self, doc: &mut Lines) {
    let bp = &self.boilerplate;
    doc.open("<back>");
    doc.open("<ref-list>");
    doc.text("title", &bp.references_title);
    doc.open(r#"<ref id="B1">"#);
    doc.text("label", "1");
    doc.text("mixed-citation", &bp.reference_citation);
    doc.close("ref");
    doc.close("ref-list");
    doc.close("back");
  }
}

/// Serializes with the default [`JatsWriter`].
pub fn to_jats(metadata: &Metadata, body: &str) -> String { JatsWriter::new().write(metadata, body) }

/// Persists a produced document at `path`.
///
/// # Errors
///
/// Write failures are reported as [`JatsError::Serialization`].
pub fn write_artifact(path: impl AsRef<Path>, xml: &str) -> Result<()> {
  let path = path.as_ref();
  std::fs::write(path, xml)
    .map_err(|e| JatsError::Serialization(format!("{}: {e}", path.display())))?;
  debug!("Wrote {} bytes to {}", xml.len(), path.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;

  fn writer() -> JatsWriter { JatsWriter::new().with_current_year(2024) }

  fn scenario() -> Metadata {
    Metadata {
      title: "Test".into(),
      journal: "J".into(),
      authors: vec![Author {
        name: "Maria Silva".into(),
        affiliation: "UFRJ".into(),
        country: "Brasil".into(),
        ..Author::default()
      }],
      ..Metadata::default()
    }
  }

  #[test]
  fn test_scenario_document() {
    let xml = writer().write(&scenario(), "");
    assert!(xml.starts_with(XML_DECLARATION));
    assert_eq!(xml.matches("<contrib ").count(), 1);
    assert!(xml.contains("<surname>Silva</surname>"));
    assert!(xml.contains("<given-names>Maria</given-names>"));
    assert!(xml.contains(r#"<country country="BR">Brasil</country>"#));
    assert!(!xml.contains("<trans-title-group"));
    assert!(!xml.contains("<trans-abstract"));
    assert!(!xml.contains("<article-id"));
    assert!(xml.contains("<!-- DOI not available"));
  }

  #[test]
  fn test_output_is_deterministic() {
    let mut metadata = scenario();
    metadata.keywords = "agua, suelo".into();
    let writer = writer();
    assert_eq!(writer.write(&metadata, "a\n\nb"), writer.write(&metadata, "a\n\nb"));
  }

  #[test]
  fn test_doi_replaces_comment() {
    let mut metadata = scenario();
    metadata.doi = "10.1590/abc<1>".into();
    let xml = writer().write(&metadata, "");
    assert!(xml.contains(r#"<article-id pub-id-type="doi">10.1590/abc&lt;1&gt;</article-id>"#));
    assert!(!xml.contains("<!--"));
  }

  #[test]
  fn test_translations_are_independent() {
    let mut metadata = scenario();
    metadata.abstract_en = "In English".into();
    let xml = writer().write(&metadata, "");
    assert!(!xml.contains("<trans-title-group"));
    assert!(xml.contains(r#"<trans-abstract xml:lang="en">"#));
    assert!(!xml.contains(r#"<kwd-group xml:lang="en">"#));

    metadata.keywords_en = "water".into();
    let xml = writer().write(&metadata, "");
    assert!(xml.contains(r#"<kwd-group xml:lang="en">"#));
    assert!(xml.contains("<kwd>water</kwd>"));
  }

  #[test]
  fn test_volume_issue_and_issn_only_when_present() {
    let xml = writer().write(&scenario(), "");
    assert!(!xml.contains("<volume>"));
    assert!(!xml.contains("<issue>"));
    assert!(!xml.contains("<issn"));

    let mut metadata = scenario();
    metadata.volume = "12".into();
    metadata.issue = "3".into();
    metadata.issn = "1234-5678".into();
    let xml = writer().write(&metadata, "");
    assert!(xml.contains("<volume>12</volume>"));
    assert!(xml.contains("<issue>3</issue>"));
    assert!(xml.contains(r#"<issn pub-type="epub">1234-5678</issn>"#));
  }

  #[test]
  fn test_pub_date_fallbacks() {
    let mut metadata = scenario();
    let xml = writer().write(&metadata, "");
    assert!(xml.contains("<year>2024</year>"));
    assert!(!xml.contains("<month>"));

    metadata.year = "2001".into();
    assert!(writer().write(&metadata, "").contains("<year>2001</year>"));

    metadata.date_published = "2022-08-09".into();
    let xml = writer().write(&metadata, "");
    assert!(xml.contains("<day>09</day>"));
    assert!(xml.contains("<month>08</month>"));
    assert!(xml.contains("<year>2022</year>"));
  }

  #[test]
  fn test_all_empty_record_still_renders() {
    let xml = writer().write(&Metadata::blank(""), "");
    assert!(xml.contains("<article-title></article-title>"));
    assert!(xml.contains("<journal-title></journal-title>"));
    assert!(xml.contains("<country></country>"));
    assert!(xml.contains("<body>\n    <p></p>\n  </body>"));
    assert!(xml.ends_with("</article>\n"));
  }

  #[test]
  fn test_boilerplate_is_configurable() {
    let boilerplate = Boilerplate {
      journal_id: "rbef".into(),
      reference_citation: "Ref -- one".into(),
      doi_placeholder: "fill -- in".into(),
      ..Boilerplate::default()
    };
    let xml = writer().with_boilerplate(boilerplate).write(&scenario(), "");
    assert!(xml.contains(r#"<journal-id journal-id-type="publisher-id">rbef</journal-id>"#));
    assert!(xml.contains("<mixed-citation>Ref -- one</mixed-citation>"));
    assert!(xml.contains("<!-- fill - - in -->"));
  }

  #[test]
  fn test_dash_runs_never_leave_a_double_dash_in_the_comment() {
    for placeholder in ["a---b", "a----b", "add DOI --- later", "-----"] {
      let boilerplate = Boilerplate { doi_placeholder: placeholder.into(), ..Boilerplate::default() };
      let xml = writer().with_boilerplate(boilerplate).write(&scenario(), "");
      let start = xml.find("<!--").unwrap() + 4;
      let end = xml[start..].find("-->").unwrap() + start;
      let inner = &xml[start..end];
      assert!(!inner.contains("--"), "{placeholder}: {inner:?}");
      assert!(!inner.ends_with('-'), "{placeholder}: {inner:?}");
    }
    assert_eq!(comment("a---b"), "<!-- a- - -b -->");
  }

  #[test]
  fn test_custom_name_splitter_is_used() {
    struct WholeNameSurname;
    impl NameSplitter for WholeNameSurname {
      fn split(&self, full_name: &str) -> crate::contrib::PersonName {
        crate::contrib::PersonName { surname: full_name.to_string(), given_names: String::new() }
      }
    }
    let xml = writer().with_name_splitter(WholeNameSurname).write(&scenario(), "");
    assert!(xml.contains("<surname>Maria Silva</surname>"));
  }

  #[test]
  fn test_configured_countries() {
    let config = Config::default().with_country("Atlantis", "AT");
    let mut metadata = scenario();
    metadata.authors[0].country = "atlantis".into();
    let xml = JatsWriter::from_config(&config).write(&metadata, "");
    assert!(xml.contains(r#"<country country="AT">atlantis</country>"#));
  }

  #[test]
  fn test_record_is_not_mutated() {
    let metadata = scenario();
    let before = metadata.clone();
    let _ = writer().write(&metadata, "body");
    assert_eq!(metadata, before);
  }

  #[test]
  fn test_write_artifact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(ARTIFACT_FILE_NAME);
    write_artifact(&path, "<a/>").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<a/>");

    let result = write_artifact(dir.path().join("missing").join("x.xml"), "<a/>");
    assert!(matches!(result, Err(JatsError::Serialization(_))));
  }
}
