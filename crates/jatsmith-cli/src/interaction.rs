//! How commands talk to the person running them.

use console::Term;
use dialoguer::Confirm;

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for user prompts
pub static PROMPT_PREFIX: &str = "❯ ";
/// Prefix for list items
pub static ITEM_PREFIX: &str = "├─";
/// Prefix for the last item of a list
pub static LAST_ITEM_PREFIX: &str = "└─";

/// Something a command wants to show.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Raw output meant for stdout, e.g. extracted text or a produced document
  Output(&'a str),
  /// A metadata record, shown as a summary
  Metadata(&'a Metadata),
  /// The operation worked
  Success(&'a str),
  /// Something the user should act on, but the operation continues
  Warning(&'a str),
  /// Neutral information
  Info(&'a str),
}

/// The channel between a command and its user.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str) -> Result<bool>;
  /// Shows `content`.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// Interaction through the terminal, with colored output and dialoguer prompts.
pub struct Terminal {
  /// Answer every prompt with yes instead of asking
  accept_defaults: bool,
  /// Where status messages go, so stdout only carries command output
  status:          Term,
}

impl Terminal {
  /// Creates a terminal interaction, optionally answering all prompts with yes.
  pub fn new(accept_defaults: bool) -> Self { Self { accept_defaults, status: Term::stderr() } }

  /// Writes a prefixed status line.
  fn status(&self, prefix: console::StyledObject<&str>, message: &str) -> Result<()> {
    self.status.write_line(&format!("{prefix} {message}"))?;
    Ok(())
  }
}

impl UserInteraction for Terminal {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      return Ok(true);
    }
    let answer = Confirm::new()
      .with_prompt(format!("{} {message}", style(PROMPT_PREFIX).cyan()))
      .default(false)
      .interact_on(&self.status)?;
    Ok(answer)
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Output(text) => println!("{text}"),
      ResponseContent::Metadata(metadata) => {
        let title = if metadata.title.is_empty() { "(untitled)" } else { &metadata.title };
        self.status(style(INFO_PREFIX).blue(), &style(title).bold().to_string())?;
        if !metadata.journal.is_empty() {
          self.status.write_line(&format!("   {}", style(&metadata.journal).italic()))?;
        }
        let count = metadata.authors.len();
        for (i, author) in metadata.authors.iter().enumerate() {
          let prefix = if i + 1 == count { LAST_ITEM_PREFIX } else { ITEM_PREFIX };
          let name = if author.name.is_empty() { "(unnamed)" } else { &author.name };
          let mut line = format!("   {} {}", style(prefix).dim(), style(name).green());
          if !author.affiliation.is_empty() {
            line.push_str(&format!(" {}", style(format!("({})", author.affiliation)).dim()));
          }
          self.status.write_line(&line)?;
        }
      },
      ResponseContent::Success(message) => self.status(style(SUCCESS_PREFIX).green(), message)?,
      ResponseContent::Warning(message) =>
        self.status(style(WARNING_PREFIX).yellow(), &style(message).yellow().to_string())?,
      ResponseContent::Info(message) => self.status(style(INFO_PREFIX).blue(), message)?,
    }
    Ok(())
  }
}
