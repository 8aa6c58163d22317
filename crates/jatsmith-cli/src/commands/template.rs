//! Module for printing an empty metadata record.

use super::*;

/// Function for the [`Commands::Template`] in the CLI.
pub fn template<I: UserInteraction>(interaction: &I) -> Result<()> {
  let record = serde_json::to_string_pretty(&Metadata::for_current_year())?;
  interaction.reply(ResponseContent::Output(&record))
}
