use super::*;

fn coordinator(notes: Arc<MemoryNotes>) -> TestResult<RequestCoordinator<Screen>> {
  let search = SearchOrchestrator::new(Arc::new(FixtureBackend::load()?));
  Ok(
    RequestCoordinator::new(Screen::default(), search)
      .with_translation(TranslationPipeline::new(Arc::new(FirstWordTranslator)))
      .with_persistence(Arc::new(move || -> Result<Arc<dyn NotePersistenceBackend>> {
        Ok(notes.clone())
      })),
  )
}

#[traced_test]
#[tokio::test]
async fn test_search_translate_then_save() -> TestResult<()> {
  let notes = Arc::new(MemoryNotes { reject: vec!["2402.05555v2".into()], ..Default::default() });
  let mut coordinator = coordinator(notes.clone())?;

  coordinator.submit(SearchConfig::new(vec!["qubits".into()], 10, "", "")?);
  settle(&mut coordinator).await;
  assert_eq!(coordinator.state(), CoordinatorState::Displaying);
  assert_eq!(coordinator.papers().len(), 3);
  assert_eq!(coordinator.papers()[0].abstract_ja, "訳:We");

  let ids: Vec<String> = coordinator.papers().iter().map(|p| p.id.clone()).collect();
  coordinator.save_selected(&ids);
  settle(&mut coordinator).await;

  assert_eq!(coordinator.papers().len(), 1);
  assert_eq!(coordinator.papers()[0].id, "2402.05555v2");
  assert_eq!(notes.created.lock().unwrap().len(), 2);
  assert_eq!(
    coordinator.presenter().shown.last(),
    Some(&Presentation::Notice(Notice::Saved { saved: 2, failed: 1 }))
  );
  Ok(())
}

#[tokio::test]
async fn test_cancel_then_resubmit() -> TestResult<()> {
  let mut coordinator = coordinator(Arc::new(MemoryNotes::default()))?;

  coordinator.submit(SearchConfig::new(vec!["qubits".into()], 10, "", "")?);
  coordinator.cancel();
  assert_eq!(coordinator.presenter().shown.last(), Some(&Presentation::Request));

  coordinator.submit(SearchConfig::new(vec!["2403.01234".into()], 10, "", "")?);
  settle(&mut coordinator).await;

  assert_eq!(coordinator.state(), CoordinatorState::Displaying);
  let results: Vec<_> = coordinator
    .presenter()
    .shown
    .iter()
    .filter_map(|p| match p {
      Presentation::Results(papers) => Some(papers.len()),
      _ => None,
    })
    .collect();
  assert_eq!(results, vec![1]);
  Ok(())
}
