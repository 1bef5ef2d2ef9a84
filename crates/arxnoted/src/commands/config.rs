//! Module for the `config` subcommands.

use super::*;

/// Configuration file actions
#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
  /// Write the default configuration file
  Init {
    /// Overwrite an existing file without asking
    #[arg(long)]
    force: bool,
  },
  /// Print the location of the configuration file
  Path,
}

/// Function for the [`Commands::Config`] in the CLI.
pub fn config<I: UserInteraction>(interaction: &I, cli: &Cli, cmd: ConfigCommands) -> Result<()> {
  let path = cli.config_path();
  match cmd {
    ConfigCommands::Path => {
      println!("{}", path.display());
      Ok(())
    },
    ConfigCommands::Init { force } => {
      if path.exists()
        && !force
        && !interaction.confirm(&format!(
          "A configuration already exists at {}. Overwrite it with the defaults?",
          path.display()
        ))?
      {
        interaction.reply(ResponseContent::Info("Kept the existing configuration"))?;
        return Ok(());
      }

      Config::default().save(&path)?;
      interaction.reply(ResponseContent::Success(&format!(
        "Wrote default configuration to {}",
        path.display()
      )))?;
      interaction.reply(ResponseContent::Info(
        "Set GEMINI_API_KEY, NOTION_API_KEY and NOTION_DATABASE_ID in the environment or a .env \
         file",
      ))
    },
  }
}
