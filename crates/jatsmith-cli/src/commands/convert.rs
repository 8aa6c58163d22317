//! Module for turning a manuscript into the XML document.

use jatsmith::{
  document::{write_artifact, JatsWriter, ARTIFACT_FILE_NAME},
  ingest::extract_path,
  llm::{MetadataSuggester, OllamaSuggester},
  workflow::Stage,
};

use super::*;

/// Options for [`Commands::Convert`].
#[derive(Args, Clone)]
pub struct ConvertOptions {
  /// The manuscript to convert (PDF or plain text)
  pub document: PathBuf,

  /// Metadata record to start from (JSON, or TOML with a .toml extension)
  #[arg(long, short)]
  pub metadata: Option<PathBuf>,

  /// Ask the configured language model to fill in the metadata first
  #[arg(long)]
  pub suggest: bool,

  /// Where to write the document, defaults to `article_JATS_SPS.xml` in the current directory
  #[arg(long, short)]
  pub output: Option<PathBuf>,

  /// Overwrite an existing output file without asking
  #[arg(long)]
  pub force: bool,
}

/// Function for the [`Commands::Convert`] in the CLI.
///
/// Runs the upload, edit and generate steps in one go. A failed suggestion only produces a
/// warning; the document is still generated from the metadata file or blank defaults.
pub async fn convert<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  options: &ConvertOptions,
) -> Result<()> {
  let ConvertOptions { document, metadata, suggest, output, force } = options;

  let body = extract_path(document).await?;
  let defaults = match metadata {
    Some(path) => Metadata::load(path)?,
    None => Metadata::for_current_year(),
  };

  let suggestion = if *suggest {
    interaction.reply(ResponseContent::Info(&format!(
      "Asking {} at {} for metadata...",
      config.llm.model, config.llm.host
    )))?;
    Some(OllamaSuggester::new(&config.llm).suggest_metadata(&body).await)
  } else {
    None
  };

  let stage = Stage::Uploading.uploaded(defaults, body, suggestion)?;
  if let Some(draft) = stage.draft() {
    if let Some(warning) = &draft.warning {
      interaction.reply(ResponseContent::Warning(warning))?;
    }
    interaction.reply(ResponseContent::Metadata(&draft.metadata))?;
    let missing = draft.metadata.missing_required();
    if !missing.is_empty() {
      interaction.reply(ResponseContent::Warning(&format!(
        "These fields are empty and will need editing in the XML: {}",
        missing.join(", ")
      )))?;
    }
  }

  let stage = stage.generate(&JatsWriter::from_config(config))?;
  let Some(xml) = stage.xml() else {
    return Ok(());
  };

  let output = output.clone().unwrap_or_else(|| PathBuf::from(ARTIFACT_FILE_NAME));
  if output.exists()
    && !force
    && !interaction
      .confirm(&format!("{} already exists, do you want to overwrite it?", output.display()))?
  {
    interaction.reply(ResponseContent::Info("Nothing was written. Pass --output to pick a path"))?;
    return Ok(());
  }

  write_artifact(&output, xml)?;
  interaction.reply(ResponseContent::Success(&format!("Wrote {}", output.display())))?;
  Ok(())
}
