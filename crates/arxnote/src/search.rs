//! Search orchestration over a pluggable backend.
//!
//! [`SearchOrchestrator::search`] turns a [`SearchConfig`] into a list of [`Paper`]s:
//!
//! 1. keywords are split into identifiers and free text ([`identifier::partition`]);
//! 2. identifiers are fetched in one batch lookup, free text in one OR query;
//! 3. both result lists are concatenated, id results first;
//! 4. hits published outside the requested window are dropped (hits with an unreadable
//!    publication date are kept);
//! 5. duplicates are removed by id, first occurrence wins;
//! 6. survivors become [`Paper`]s with an empty translation.
//!
//! The concatenated list is not truncated to `max_results`; each query is capped on its own.
//!
//! [`identifier::partition`]: crate::identifier::partition

use std::collections::HashSet;

use super::*;
use crate::{date::DateRange, identifier::partition};

/// Capability for querying a preprint repository.
///
/// Implemented by [`ArxivClient`](crate::arxiv::ArxivClient); tests use in-memory fakes.
/// Implementations should apply a bounded timeout to every call and report failures as
/// errors rather than empty results.
#[async_trait]
pub trait SearchBackend: Send + Sync {
  /// Fetches entries by identifier, at most `limit` of them.
  async fn query_by_id(&self, ids: &[String], limit: usize) -> Result<Vec<RawHit>>;

  /// Fetches the newest entries whose abstract matches any of `terms`, at most `limit`.
  async fn query_by_text(&self, terms: &[String], limit: usize) -> Result<Vec<RawHit>>;
}

/// Runs searches against a [`SearchBackend`].
#[derive(Clone)]
pub struct SearchOrchestrator {
  /// Backend every query goes to
  backend: Arc<dyn SearchBackend>,
}

impl std::fmt::Debug for SearchOrchestrator {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SearchOrchestrator").finish_non_exhaustive()
  }
}

impl SearchOrchestrator {
  /// Creates an orchestrator over `backend`.
  pub fn new(backend: Arc<dyn SearchBackend>) -> Self { Self { backend } }

  /// Runs `config` with date expressions resolved against the local date.
  pub async fn search(&self, config: &SearchConfig) -> Result<Vec<Paper>> {
    self.search_at(config, date::today()).await
  }

  /// Runs `config` with date expressions resolved against `today`.
  ///
  /// # Errors
  ///
  /// - [`ArxnoteError::UnparseableDateExpression`] if either date expression is invalid;
  ///   checked before any backend call.
  /// - [`ArxnoteError::SearchFailed`] if a backend query fails.
  pub async fn search_at(&self, config: &SearchConfig, today: NaiveDate) -> Result<Vec<Paper>> {
    let range = DateRange::resolve_at(&config.start_date, &config.end_date, today)?;
    let split = partition(&config.keywords);
    debug!(
      "Searching {} identifier(s) and {} text term(s) within {}..{}",
      split.ids.len(),
      split.text_terms.len(),
      range.start,
      range.end
    );

    let mut hits = Vec::new();
    if !split.ids.is_empty() {
      hits.extend(
        self.backend.query_by_id(&split.ids, config.max_results).await.map_err(search_failed)?,
      );
    }
    if !split.text_terms.is_empty() {
      hits.extend(
        self
          .backend
          .query_by_text(&split.text_terms, config.max_results)
          .await
          .map_err(search_failed)?,
      );
    }

    let total = hits.len();
    let papers = collect_papers(hits, &range);
    info!("Search returned {} hit(s), {} paper(s) after filtering", total, papers.len());
    Ok(papers)
  }
}

/// Filters `hits` to `range`, removes duplicate ids and converts the rest into papers.
///
/// Hits whose publication date cannot be parsed are kept regardless of the range.
pub fn collect_papers(hits: Vec<RawHit>, range: &DateRange) -> Vec<Paper> {
  let mut seen = HashSet::new();
  hits
    .into_iter()
    .filter(|hit| match hit.published_at() {
      Some(published) => range.contains(published.date()),
      None => {
        trace!("Keeping {} with unparseable date {:?}", hit.id, hit.published);
        true
      },
    })
    .filter(|hit| seen.insert(hit.id.clone()))
    .map(Paper::from)
    .collect()
}

/// Folds any backend error into [`ArxnoteError::SearchFailed`].
fn search_failed(error: ArxnoteError) -> ArxnoteError {
  match error {
    ArxnoteError::SearchFailed(_) => error,
    other => ArxnoteError::SearchFailed(other.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;

  /// Records queries and answers from canned hit lists.
  #[derive(Default)]
  struct FakeBackend {
    by_id:   Vec<RawHit>,
    by_text: Vec<RawHit>,
    fail:    bool,
    calls:   Mutex<Vec<String>>,
  }

  #[async_trait]
  impl SearchBackend for FakeBackend {
    async fn query_by_id(&self, ids: &[String], limit: usize) -> Result<Vec<RawHit>> {
      self.calls.lock().unwrap().push(format!("id:{}:{limit}", ids.join(",")));
      if self.fail {
        return Err(ArxnoteError::ApiError("503".into()));
      }
      Ok(self.by_id.iter().take(limit).cloned().collect())
    }

    async fn query_by_text(&self, terms: &[String], limit: usize) -> Result<Vec<RawHit>> {
      self.calls.lock().unwrap().push(format!("text:{}:{limit}", terms.join("|")));
      if self.fail {
        return Err(ArxnoteError::ApiError("503".into()));
      }
      Ok(self.by_text.iter().take(limit).cloned().collect())
    }
  }

  fn hit(id: &str, published: &str) -> RawHit {
    RawHit {
      id: id.into(),
      title: format!("Title {id}"),
      published: published.into(),
      ..Default::default()
    }
  }

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, 15).unwrap() }

  async fn run(backend: FakeBackend, keywords: &[&str], start: &str, end: &str) -> Vec<Paper> {
    let config =
      SearchConfig::new(keywords.iter().map(|k| k.to_string()).collect(), 10, start, end)
        .unwrap();
    SearchOrchestrator::new(Arc::new(backend)).search_at(&config, today()).await.unwrap()
  }

  #[traced_test]
  #[tokio::test]
  async fn test_identifier_only_search_skips_text_query() {
    let backend = Arc::new(FakeBackend {
      by_id: vec![hit("2101.12345", "2021-01-29T00:00:00Z")],
      ..Default::default()
    });
    let config = SearchConfig::new(vec!["2101.12345".into()], 5, "", "").unwrap();
    let papers =
      SearchOrchestrator::new(backend.clone()).search_at(&config, today()).await.unwrap();

    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].id, "2101.12345");
    assert_eq!(*backend.calls.lock().unwrap(), vec!["id:2101.12345:5"]);
  }

  #[tokio::test]
  async fn test_mixed_keywords_concatenate_id_results_first() {
    let backend = FakeBackend {
      by_id: vec![hit("A", "2024-03-01T00:00:00Z")],
      by_text: vec![hit("B", "2024-03-02T00:00:00Z"), hit("C", "2024-03-03T00:00:00Z")],
      ..Default::default()
    };
    let papers = run(backend, &["https://arxiv.org/abs/2401.00001", "llm"], "", "").await;
    assert_eq!(papers.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["A", "B", "C"]);
  }

  #[tokio::test]
  async fn test_duplicates_keep_first_occurrence() {
    let mut duplicate = hit("A", "2024-03-01T00:00:00Z");
    duplicate.title = "Second copy".into();
    let backend = FakeBackend {
      by_id: vec![hit("A", "2024-03-01T00:00:00Z")],
      by_text: vec![duplicate, hit("B", "2024-03-01T00:00:00Z")],
      ..Default::default()
    };
    let papers = run(backend, &["2401.00001", "llm"], "", "").await;
    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].id, "A");
    assert_eq!(papers[0].title, "Title A");
  }

  #[tokio::test]
  async fn test_date_filtering() {
    let backend = FakeBackend {
      by_text: vec![
        hit("inside", "2024-03-10T12:00:00Z"),
        hit("edge", "2024-03-05T00:00:00Z"),
        hit("outside", "2024-02-01T00:00:00Z"),
        hit("future", "2024-03-16T00:00:00Z"),
        hit("undated", "not a date"),
      ],
      ..Default::default()
    };
    let papers = run(backend, &["llm"], "-10d", "today").await;
    assert_eq!(
      papers.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
      vec!["inside", "edge", "undated"]
    );
  }

  #[tokio::test]
  async fn test_inverted_range_is_normalized() {
    let backend = FakeBackend {
      by_text: vec![hit("inside", "2024-03-10T12:00:00Z"), hit("old", "2023-01-01T00:00:00Z")],
      ..Default::default()
    };
    let papers = run(backend, &["llm"], "0年0月0日前", "0年1月0日前").await;
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].id, "inside");
  }

  #[tokio::test]
  async fn test_merge_is_not_truncated() {
    let backend = FakeBackend {
      by_id: (0..3).map(|i| hit(&format!("id{i}"), "")).collect(),
      by_text: (0..3).map(|i| hit(&format!("text{i}"), "")).collect(),
      ..Default::default()
    };
    let config = SearchConfig::new(vec!["2101.12345".into(), "llm".into()], 3, "", "").unwrap();
    let papers =
      SearchOrchestrator::new(Arc::new(backend)).search_at(&config, today()).await.unwrap();
    assert_eq!(papers.len(), 6);
  }

  #[tokio::test]
  async fn test_backend_failure_is_search_failed() {
    let backend = FakeBackend { fail: true, ..Default::default() };
    let config = SearchConfig::new(vec!["llm".into()], 3, "", "").unwrap();
    let result = SearchOrchestrator::new(Arc::new(backend)).search_at(&config, today()).await;
    assert!(matches!(result, Err(ArxnoteError::SearchFailed(message)) if message.contains("503")));
  }

  #[tokio::test]
  async fn test_bad_date_fails_before_querying() {
    let backend = Arc::new(FakeBackend::default());
    let config = SearchConfig::new(vec!["llm".into()], 3, "whenever", "").unwrap();
    let result = SearchOrchestrator::new(backend.clone()).search_at(&config, today()).await;
    assert!(matches!(result, Err(ArxnoteError::UnparseableDateExpression(_))));
    assert!(backend.calls.lock().unwrap().is_empty());
  }
}
