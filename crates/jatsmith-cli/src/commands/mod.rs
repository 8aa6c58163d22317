//! The subcommands of the CLI.

use super::*;

pub mod convert;
pub mod extract;
pub mod init;
pub mod suggest;
pub mod template;

pub use convert::{convert, ConvertOptions};
pub use extract::extract;
pub use init::init;
pub use suggest::suggest;
pub use template::template;

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Write a configuration file with the default journal boilerplate
  Init,

  /// Print the body text extracted from a manuscript (PDF or plain text)
  Extract {
    /// The manuscript to read
    document: PathBuf,
  },

  /// Ask the configured language model for metadata and print it as JSON
  Suggest {
    /// The manuscript to read
    document: PathBuf,
  },

  /// Produce the JATS/SPS XML document for a manuscript
  Convert(ConvertOptions),

  /// Print an empty metadata record to fill in
  Template,
}
