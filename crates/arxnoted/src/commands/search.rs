//! Module for the headless `search` command.

use std::sync::Arc;

use arxnote::{
  arxiv::ArxivClient, llm::translator_from_settings, paper::SearchConfig,
  search::SearchOrchestrator, translate::TranslationPipeline,
};
use tokio_util::sync::CancellationToken;

use super::*;

/// Options for [`Commands::Search`]
#[derive(Args, Clone)]
pub struct SearchOptions {
  /// Keywords, arXiv identifiers or arXiv URLs
  #[arg(required = true)]
  pub keywords: Vec<String>,

  /// Maximum hits per query (defaults to the configured value)
  #[arg(long, short = 'n')]
  pub max_results: Option<usize>,

  /// Start of the date window, e.g. "-30d", "2024-01-01" or "0年1月0日前"
  #[arg(long, allow_hyphen_values = true)]
  pub start: Option<String>,

  /// End of the date window, e.g. "today"
  #[arg(long, allow_hyphen_values = true)]
  pub end: Option<String>,

  /// Skip translating abstracts
  #[arg(long)]
  pub no_translate: bool,
}

/// Function for the [`Commands::Search`] in the CLI.
pub async fn search<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  options: SearchOptions,
) -> Result<()> {
  let SearchOptions { keywords, max_results, start, end, no_translate } = options;
  let request = SearchConfig::new(
    keywords,
    max_results.unwrap_or(config.search.max_results),
    start.unwrap_or_else(|| config.search.start_date.clone()),
    end.unwrap_or_else(|| config.search.end_date.clone()),
  )?;

  let orchestrator = SearchOrchestrator::new(Arc::new(ArxivClient::new(&config.search)?));
  let mut papers = orchestrator.search(&request).await?;

  if papers.is_empty() {
    return interaction.reply(ResponseContent::Info("No papers found"));
  }

  if !no_translate {
    match translator_from_settings(&config.translation) {
      Ok(Some(translator)) => {
        let report = TranslationPipeline::new(translator)
          .translate_papers(&mut papers, &CancellationToken::new())
          .await?;
        if report.failed > 0 {
          interaction.reply(ResponseContent::Warning(&format!(
            "{} abstract(s) could not be translated",
            report.failed
          )))?;
        }
      },
      Ok(None) => {},
      Err(e) => interaction
        .reply(ResponseContent::Warning(&format!("Skipping translation: {e}")))?,
    }
  }

  interaction.reply(ResponseContent::Papers(&papers))
}
