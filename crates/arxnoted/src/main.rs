//! Terminal front-end for arxnote: search arXiv, read translated abstracts and file papers
//! into Notion.
//!
//! # Usage
//!
//! ```bash
//! # Open the terminal UI (the default)
//! arxnote
//!
//! # Search from the command line
//! arxnote search "graph neural networks" 2401.00001 --start -7d --end today
//!
//! # Write a default configuration file
//! arxnote config init
//! ```
//!
//! Credentials are read from the environment, or from a `.env` file in the working
//! directory: `GEMINI_API_KEY` for translation, `NOTION_API_KEY` and `NOTION_DATABASE_ID`
//! for saving. Use `-v` up to `-vvvv` for more logging; in the terminal UI logs go to a file
//! under the local data directory.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use arxnote::{error::ArxnoteError, paper::Paper, Config};
use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use tracing::{debug, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;
#[cfg(feature = "tui")] pub mod tui;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Search arXiv, translate abstracts and file papers into Notion")]
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
  /// config directory.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Option<Commands>,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

impl Cli {
  /// Configuration file in effect.
  pub fn config_path(&self) -> PathBuf { self.config.clone().unwrap_or_else(Config::default_path) }
}

/// Configures the logging system based on the verbosity level
///
/// # Arguments
///
/// * `verbosity` - Number of times the verbose flag was used
/// * `to_file` - Write to a daily rolling file instead of stderr
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `RUST_LOG` overrides the level when set. The returned guard must be kept alive for file
/// logging to flush.
fn setup_logging(verbosity: u8, to_file: bool) -> Option<WorkerGuard> {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true);

  if to_file {
    let appender = tracing_appender::rolling::daily(Config::log_dir(), "arxnote.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    builder.with_ansi(false).with_writer(writer).init();
    Some(guard)
  } else {
    builder.with_writer(std::io::stderr).init();
    None
  }
}

/// Entry point for the arxnote application
///
/// Loads `.env`, parses arguments, sets up logging and runs the requested command. Errors
/// are printed to stderr and turn into a non-zero exit code.
#[tokio::main]
async fn main() {
  let dotenv = dotenvy::dotenv();
  let cli = Cli::parse();

  // Handle the command, using TUI as default when enabled
  let command = cli.command.clone().unwrap_or_else(|| {
    #[cfg(feature = "tui")]
    return Commands::Tui;

    #[cfg(not(feature = "tui"))]
    {
      println!("Please specify a command. Use --help for usage information.");
      std::process::exit(1);
    }
  });

  let _guard = setup_logging(cli.verbose, command.is_tui());
  match dotenv {
    Ok(path) => debug!("Loaded environment from {}", path.display()),
    Err(e) => trace!("No .env loaded: {e}"),
  }

  if let Err(e) = run(&cli, command).await {
    warn!("Command failed: {e:?}");
    eprintln!("{} {}", style(ERROR_PREFIX).red(), style(&e).red());
    std::process::exit(1);
  }
}

/// Dispatches `command`.
async fn run(cli: &Cli, command: Commands) -> Result<()> {
  match command {
    Commands::Search(options) => {
      let config = Config::load(cli.config_path())?;
      search(cli, &config, options).await
    },
    Commands::Config { cmd } => config(cli, cli, cmd),
    #[cfg(feature = "tui")]
    Commands::Tui => {
      let config = Config::load(cli.config_path())?;
      tui::run(config).await
    },
  }
}
