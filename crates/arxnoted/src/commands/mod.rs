//! Subcommands of the `arxnote` binary.

use super::*;

pub mod config;
pub mod search;

pub use config::{config, ConfigCommands};
pub use search::{search, SearchOptions};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Launch the Terminal User Interface (default when no command specified)
  #[cfg(feature = "tui")]
  #[clap(hide = true)] // Hide from help since it's the default
  Tui,

  /// Search arXiv and print the results
  Search(SearchOptions),

  /// Manage the configuration file
  Config {
    /// The configuration action
    #[command(subcommand)]
    cmd: ConfigCommands,
  },
}

impl Commands {
  /// Whether this command takes over the terminal.
  pub fn is_tui(&self) -> bool {
    #[cfg(feature = "tui")]
    if matches!(self, Self::Tui) {
      return true;
    }
    false
  }
}
