//! Command line front end for turning manuscripts into JATS/SPS XML.
//!
//! This crate wraps the `jatsmith` library in a small CLI. It supports:
//! - Writing a starting configuration with the journal boilerplate
//! - Extracting body text from PDF and plain text manuscripts
//! - Asking a local Ollama model for metadata suggestions
//! - Producing the XML document from a manuscript and a metadata file
//!
//! # Usage
//!
//! ```bash
//! # Write the default configuration
//! jatsmith init
//!
//! # Print a metadata file to fill in
//! jatsmith template > article.json
//!
//! # Produce article_JATS_SPS.xml from a manuscript
//! jatsmith convert paper.pdf --metadata article.json
//!
//! # Let the model fill in what it can first
//! jatsmith convert paper.pdf --metadata article.json --suggest
//! ```
//!
//! Output is colored and overwriting an existing document asks for confirmation first. The `-v`
//! flag raises the logging verbosity.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use jatsmith::{config::Config, error::JatsError, metadata::Metadata};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Turn manuscripts into JATS/SPS XML documents")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the configuration file. If not specified, uses the default platform-specific
  /// configuration directory.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

impl Cli {
  /// The configuration file this invocation reads and writes.
  fn config_path(&self) -> PathBuf { self.config.clone().unwrap_or_else(Config::default_path) }
}

/// Configures the logging system based on the verbosity level
///
/// # Arguments
///
/// * `verbosity` - Number of times the verbose flag was used
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

/// Runs the parsed command.
async fn run(cli: &Cli) -> Result<()> {
  let interaction = Terminal::new(cli.accept_defaults);
  let config_path = cli.config_path();
  trace!("Using configuration path {}", config_path.display());

  match &cli.command {
    Commands::Init => init(&interaction, &config_path).await,
    Commands::Template => template(&interaction),
    Commands::Extract { document } => extract(&interaction, document).await,
    Commands::Suggest { document } =>
      suggest(&interaction, &load_config(&config_path)?, document).await,
    Commands::Convert(options) =>
      convert(&interaction, &load_config(&config_path)?, options).await,
  }
}

/// Loads the configuration, using defaults when none was written yet.
fn load_config(path: &Path) -> Result<Config> {
  let config = Config::load_or_default(path)?;
  debug!("Loaded configuration from {}", path.display());
  Ok(config)
}

/// Entry point for the jatsmith CLI application
///
/// Handles command line argument parsing, sets up logging, and executes the requested command.
/// Failures are printed with the error prefix and end the process with a non-zero exit code.
#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  if let Err(e) = run(&cli).await {
    eprintln!("{} {e}", style(ERROR_PREFIX).red());
    std::process::exit(1);
  }
}
