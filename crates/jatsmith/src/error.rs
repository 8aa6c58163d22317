//! Error types for the jatsmith library.
//!
//! The serializer itself never fails for a well-typed record. Errors come from the collaborators
//! around it:
//! - Extracting body text from an uploaded document
//! - Asking a language model for metadata suggestions
//! - Persisting the produced artifact
//! - Loading configuration
//!
//! # Examples
//!
//! ```
//! use jatsmith::error::JatsError;
//!
//! let err = JatsError::Suggestion("model offline".to_string());
//! assert!(!err.is_fatal());
//!
//! let err = JatsError::Ingestion("truncated PDF".to_string());
//! assert!(err.is_fatal());
//! ```

use thiserror::Error;

/// Error type alias used for the [`jatsmith`](crate) crate.
pub type Result<T> = core::result::Result<T, JatsError>;

/// Errors that can occur when producing a JATS document.
#[derive(Error, Debug)]
pub enum JatsError {
  /// Body text could not be extracted from the uploaded document.
  ///
  /// Fatal for the current document: the user has to retry with a different file and nothing
  /// extracted so far is kept.
  #[error("Could not extract text from the document: {0}")]
  Ingestion(String),

  /// The uploaded document is of a kind no extractor handles.
  ///
  /// The string parameter holds the offending file name or extension.
  #[error("Unsupported document type: {0}")]
  UnsupportedDocument(String),

  /// The metadata suggester failed or returned something unusable.
  ///
  /// Not fatal: the caller continues with the defaults it already has and asks the user to fill
  /// the fields in manually.
  #[error("AI extraction failed, fill in manually: {0}")]
  Suggestion(String),

  /// The produced document could not be handed over, e.g. writing the artifact failed.
  #[error("Could not produce the XML document: {0}")]
  Serialization(String),

  /// The record was rejected before serialization, e.g. it has no authors.
  #[error("Invalid metadata: {0}")]
  InvalidMetadata(String),

  /// A workflow step was requested from a stage that does not allow it.
  #[error("Cannot {action} while {stage}")]
  InvalidTransition {
    /// The stage the workflow was in
    stage:  &'static str,
    /// The requested step
    action: &'static str,
  },

  /// A file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// PDF parsing errors from the lopdf library.
  ///
  /// Covers malformed or encrypted files, missing objects and undecodable content streams.
  #[error(transparent)]
  Lopdf(#[from] lopdf::Error),

  /// A network request to the language model failed.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// JSON (de)serialization failed.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// A configuration could not be written out.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// A model was not specified for the LLM request.
  #[error("No model was chosen for the LLM.")]
  LLMMissingModel,

  /// No messages were provided in the LLM request.
  #[error("No messages were supplied to send to the LLM.")]
  LLMMissingMessage,

  #[error("{0}")]
  Config(String),
}

impl JatsError {
  /// Whether the current document has to be abandoned.
  ///
  /// Only suggestion failures are recoverable; the workflow keeps going with default metadata.
  pub fn is_fatal(&self) -> bool { !matches!(self, Self::Suggestion(_)) }
}
