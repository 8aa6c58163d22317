//! Module for printing the body text of a manuscript.

use jatsmith::ingest::extract_path;

use super::*;

/// Function for the [`Commands::Extract`] in the CLI.
pub async fn extract<I: UserInteraction>(interaction: &I, document: &Path) -> Result<()> {
  let body = extract_path(document).await?;
  if body.trim().is_empty() {
    interaction.reply(ResponseContent::Warning("No text was found in the document"))?;
  }
  interaction.reply(ResponseContent::Output(&body))
}
