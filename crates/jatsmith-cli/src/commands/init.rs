//! Module for writing a starting configuration.

use super::*;

/// Function for the [`Commands::Init`] in the CLI.
pub async fn init<I: UserInteraction>(interaction: &I, path: &Path) -> Result<()> {
  if path.exists()
    && !interaction.confirm(&format!(
      "A configuration already exists at {}, do you want to overwrite it?",
      path.display()
    ))?
  {
    interaction.reply(ResponseContent::Info(
      "Keeping the existing configuration. Pass a different location with --config",
    ))?;
    return Ok(());
  }

  Config::default().save(path)?;
  interaction.reply(ResponseContent::Success(&format!(
    "Wrote the default configuration to {}\nEdit the boilerplate section to match your journal.",
    path.display()
  )))?;
  Ok(())
}
