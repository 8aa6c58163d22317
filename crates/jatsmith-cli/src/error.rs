//! Error types for the jatsmith CLI.

use thiserror::Error;

use super::*;

/// Error type alias used for the CLI.
pub type Result<T> = core::result::Result<T, JatsCliError>;

/// Errors a CLI command can end with.
#[derive(Error, Debug)]
pub enum JatsCliError {
  /// Errors from the `jatsmith` library.
  #[error(transparent)]
  Jats(#[from] JatsError),

  /// A prompt could not be shown or answered.
  #[error(transparent)]
  Dialoguer(#[from] dialoguer::Error),

  /// Writing to the terminal or a file failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Output could not be rendered as JSON.
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}
