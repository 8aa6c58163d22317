use async_trait::async_trait;
use jatsmith::{
  error::JatsError,
  ingest::{extract_path, PlainTextExtractor, TextExtractor},
  llm::{parse_suggestion, MetadataSuggester},
  metadata::Suggestion,
  workflow::{Stage, SUGGESTION_WARNING},
};
use tempfile::tempdir;

use super::*;

/// Replays a canned model reply.
struct CannedSuggester(&'static str);

#[async_trait]
impl MetadataSuggester for CannedSuggester {
  async fn suggest_metadata(&self, _text: &str) -> jatsmith::error::Result<Suggestion> {
    parse_suggestion(self.0)
  }
}

/// Always fails, like an unreachable model.
struct OfflineSuggester;

#[async_trait]
impl MetadataSuggester for OfflineSuggester {
  async fn suggest_metadata(&self, _text: &str) -> jatsmith::error::Result<Suggestion> {
    Err(JatsError::Suggestion("connection refused".to_string()))
  }
}

async fn run(suggester: &dyn MetadataSuggester, text: &str) -> TestResult<Stage> {
  let body = PlainTextExtractor.extract_text(text.as_bytes())?;
  let suggestion = suggester.suggest_metadata(&body).await;
  let stage = Stage::Uploading.uploaded(Metadata::blank("2024"), body, Some(suggestion))?;
  Ok(stage)
}

#[tokio::test]
async fn test_document_to_xml_with_suggestions() -> TestResult<()> {
  let suggester = CannedSuggester(
    r#"Here you go: {"title": "Aguas profundas", "titleEn": "Deep waters", "journal": "Revista",
       "year": 1999, "keywords": "agua, mar", "authors": [
         {"name": "Maria Silva", "affiliation": "UFRJ", "country": "Brasil"},
         {"name": "Juan Pérez", "affiliation": "UNAM", "country": "México", "orcid": "0000-0001-2345-6789"}
       ]}"#,
  );
  let stage = run(&suggester, "Aguas profundas\n\nEl agua es profunda.").await?;
  let draft = stage.draft().unwrap();
  assert_eq!(draft.warning, None);
  assert_eq!(draft.metadata.year, "2024");

  let stage = stage.edit(|m| m.doi = "10.1590/xyz".to_string())?;
  let stage = stage.generate(&writer())?;
  let elements = parse(stage.xml().unwrap());

  assert_eq!(named(&elements, "article-title")[0].text, "Aguas profundas");
  assert_eq!(named(&elements, "trans-title")[0].text, "Deep waters");
  assert_eq!(named(&elements, "article-id")[0].text, "10.1590/xyz");
  let codes: Vec<_> = named(&elements, "country").iter().map(|c| c.attrs["country"].clone()).collect();
  assert_eq!(codes, ["BR", "MX"]);
  assert_eq!(named(&elements, "year")[0].text, "2024");
  let paragraphs: Vec<_> = named(&elements, "p").iter().map(|p| p.text.clone()).collect();
  assert!(paragraphs.ends_with(&["Aguas profundas".to_string(), "El agua es profunda.".to_string()]));
  Ok(())
}

#[tokio::test]
async fn test_failed_suggestion_falls_back_to_defaults() -> TestResult<()> {
  let stage = run(&OfflineSuggester, "Texto").await?;
  let draft = stage.draft().unwrap();
  assert_eq!(draft.warning.as_deref(), Some(SUGGESTION_WARNING));
  assert_eq!(draft.metadata, Metadata::blank("2024"));

  // Still generates, mostly boilerplate
  let stage = stage.generate(&writer())?;
  assert_eq!(named(&parse(stage.xml().unwrap()), "contrib").len(), 1);
  Ok(())
}

#[tokio::test]
async fn test_garbled_reply_is_a_suggestion_error() {
  let result = CannedSuggester("I could not find anything").suggest_metadata("x").await;
  let err = result.unwrap_err();
  assert!(matches!(err, JatsError::Suggestion(_)));
  assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_unsupported_upload_is_fatal() -> TestResult<()> {
  let dir = tempdir()?;
  let path = dir.path().join("paper.docx");
  std::fs::write(&path, b"PK\x03\x04")?;
  let err = extract_path(&path).await.unwrap_err();
  assert!(matches!(err, JatsError::UnsupportedDocument(_)));
  assert!(err.is_fatal());
  Ok(())
}

#[tokio::test]
async fn test_control_characters_never_reach_the_document() -> TestResult<()> {
  let stage = run(&OfflineSuggester, "page1\u{c}page2\u{0}").await?;
  let stage = stage.generate(&writer())?;
  let xml = stage.xml().unwrap();
  assert!(!xml.contains('\u{c}'));
  assert!(!xml.contains('\u{0}'));
  let paragraphs: Vec<_> = named(&parse(xml), "p").iter().map(|p| p.text.clone()).collect();
  assert!(paragraphs.ends_with(&["page1".to_string(), "page2".to_string()]));
  Ok(())
}
