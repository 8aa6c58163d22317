//! Body text extraction from uploaded documents.
//!
//! Extraction is a collaborator of the serializer, not part of it. Any failure here is fatal for
//! the current document and surfaces as [`JatsError::Ingestion`] (or
//! [`JatsError::UnsupportedDocument`] for file kinds with no extractor); nothing partial is kept.
//!
//! ```no_run
//! use jatsmith::ingest;
//!
//! # async fn example() -> Result<(), jatsmith::error::JatsError> {
//! let body = ingest::extract_path("manuscript.pdf").await?;
//! println!("{} characters extracted", body.len());
//! # Ok(())
//! # }
//! ```

use lopdf::Document;

use super::*;

/// Something that turns the bytes of an uploaded document into plain text.
pub trait TextExtractor: Send + Sync {
  /// Extracts the text of `document`.
  ///
  /// # Errors
  ///
  /// Returns [`JatsError::Ingestion`] when the document cannot be read.
  fn extract_text(&self, document: &[u8]) -> Result<String>;
}

/// Whether `c` may appear in an XML 1.0 document (the `Char` production).
fn is_xml_char(c: char) -> bool {
  matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Drops characters XML 1.0 forbids, such as NUL or stray control codes.
///
/// Form feeds, which PDF text often carries between pages, become newlines so they still
/// separate paragraphs.
///
/// ```
/// use jatsmith::ingest::xml_safe_text;
///
/// assert_eq!(xml_safe_text("page1\u{c}page2\u{0}"), "page1\npage2");
/// ```
pub fn xml_safe_text(text: &str) -> String {
  text
    .chars()
    .filter_map(|c| match c {
      '\u{c}' => Some('\n'),
      c if is_xml_char(c) => Some(c),
      _ => None,
    })
    .collect()
}

/// Reads UTF-8 text, replacing invalid sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
  fn extract_text(&self, document: &[u8]) -> Result<String> {
    let text = String::from_utf8_lossy(document);
    // Strip a UTF-8 byte order mark left by some editors
    Ok(xml_safe_text(text.strip_prefix('\u{feff}').unwrap_or(&text)))
  }
}

/// Extracts the text of every page of a PDF, in page order, separated by blank lines.
///
/// Like [`PlainTextExtractor`], the result only holds characters XML allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
  #[instrument(skip_all, fields(bytes = document.len()), level = "debug")]
  fn extract_text(&self, document: &[u8]) -> Result<String> {
    let doc = Document::load_mem(document).map_err(|e| JatsError::Ingestion(e.to_string()))?;
    if doc.is_encrypted() {
      return Err(JatsError::Ingestion("the PDF is encrypted".to_string()));
    }

    let pages: Vec<u32> = doc.get_pages().into_keys().collect();
    if pages.is_empty() {
      return Err(JatsError::Ingestion("the PDF has no pages".to_string()));
    }

    let mut chunks = Vec::with_capacity(pages.len());
    for page in pages {
      match doc.extract_text(&[page]) {
        Ok(text) => chunks.push(xml_safe_text(text.trim())),
        Err(e) => {
          warn!(page, "Could not extract text from page: {e}");
        },
      }
    }

    if chunks.iter().all(String::is_empty) {
      return Err(JatsError::Ingestion("no text could be extracted from the PDF".to_string()));
    }
    trace!(pages = chunks.len(), "Extracted PDF text");
    Ok(chunks.join("\n\n"))
  }
}

/// Picks the extractor for `path` from its extension.
///
/// # Errors
///
/// Returns [`JatsError::UnsupportedDocument`] for anything other than PDF or plain text.
pub fn extractor_for_path(path: impl AsRef<Path>) -> Result<Box<dyn TextExtractor>> {
  let path = path.as_ref();
  let extension =
    path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).unwrap_or_default();
  match extension.as_str() {
    "pdf" => Ok(Box::new(PdfExtractor)),
    "txt" | "text" | "md" => Ok(Box::new(PlainTextExtractor)),
    _ => Err(JatsError::UnsupportedDocument(path.display().to_string())),
  }
}

/// Reads and extracts the document at `path`.
///
/// # Errors
///
/// Unreadable files and extraction failures are reported as [`JatsError::Ingestion`].
pub fn extract_file(path: impl AsRef<Path>) -> Result<String> {
  let path = path.as_ref();
  let extractor = extractor_for_path(path)?;
  let bytes = std::fs::read(path)
    .map_err(|e| JatsError::Ingestion(format!("{}: {e}", path.display())))?;
  debug!("Extracting text from {}", path.display());
  extractor.extract_text(&bytes)
}

/// Async variant of [`extract_file`] that keeps PDF parsing off the runtime threads.
pub async fn extract_path(path: impl AsRef<Path>) -> Result<String> {
  let path = path.as_ref().to_path_buf();
  tokio::task::spawn_blocking(move || extract_file(path))
    .await
    .map_err(|e| JatsError::Ingestion(e.to_string()))?
}
