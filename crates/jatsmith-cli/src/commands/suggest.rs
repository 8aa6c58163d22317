//! Module for asking the language model about a manuscript.

use jatsmith::{
  ingest::extract_path,
  llm::{MetadataSuggester, OllamaSuggester},
};

use super::*;

/// Function for the [`Commands::Suggest`] in the CLI.
///
/// Unlike `convert --suggest`, a failed suggestion is the whole point of this command and ends it
/// with an error.
pub async fn suggest<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  document: &Path,
) -> Result<()> {
  let body = extract_path(document).await?;
  interaction.reply(ResponseContent::Info(&format!(
    "Asking {} at {} for metadata...",
    config.llm.model, config.llm.host
  )))?;

  let suggestion = OllamaSuggester::new(&config.llm).suggest_metadata(&body).await?;
  interaction.reply(ResponseContent::Output(&serde_json::to_string_pretty(&suggestion)?))
}
