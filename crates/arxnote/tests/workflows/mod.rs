use super::*;

mod search_and_save;

#[tokio::test]
async fn test_fixture_search_with_date_window() -> TestResult<()> {
  let orchestrator = SearchOrchestrator::new(Arc::new(FixtureBackend::load()?));
  let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

  let config = SearchConfig::new(vec!["quantum".into()], 10, "-30d", "today")?;
  let papers = orchestrator.search_at(&config, today).await?;
  let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
  assert_eq!(ids, vec!["2403.01234v1", "2402.05555v2"]);

  let config = SearchConfig::new(vec!["quantum".into()], 10, "", "")?;
  assert_eq!(orchestrator.search_at(&config, today).await?.len(), 3);
  Ok(())
}

#[tokio::test]
async fn test_fixture_id_and_url_lookup_deduplicates() -> TestResult<()> {
  let orchestrator = SearchOrchestrator::new(Arc::new(FixtureBackend::load()?));
  let config = SearchConfig::new(
    vec!["https://arxiv.org/abs/2402.05555".into(), "2402.05555v2".into()],
    10,
    "",
    "",
  )?;

  let papers = orchestrator.search(&config).await?;
  assert_eq!(papers.len(), 1);
  assert_eq!(papers[0].title, "Error Correction for Noisy Qubits");
  assert_eq!(papers[0].author_line(), "Alice Example, Bob Example");
  assert_eq!(papers[0].category, "quant-ph,cs.ET");
  Ok(())
}

#[tokio::test]
async fn test_unparseable_date_is_rejected() -> TestResult<()> {
  let orchestrator = SearchOrchestrator::new(Arc::new(FixtureBackend::load()?));
  let config = SearchConfig::new(vec!["quantum".into()], 10, "last week", "")?;
  assert!(matches!(
    orchestrator.search(&config).await,
    Err(ArxnoteError::UnparseableDateExpression(_))
  ));
  Ok(())
}
