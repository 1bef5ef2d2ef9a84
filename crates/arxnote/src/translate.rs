//! Cancellation-aware batch translation of abstracts.
//!
//! A [`Translator`] turns one text into one translation. [`TranslationPipeline`] runs a
//! translator over a batch, one item at a time, and checks a [`CancellationToken`] before
//! every item so a superseded request stops spending tokens at the next boundary.
//!
//! Per-item failures are absorbed: the item keeps an empty translation and the batch goes
//! on. Only cancellation ends a batch early.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use arxnote::{error::Result, translate::*};
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Upper;
//!
//! #[async_trait]
//! impl Translator for Upper {
//!   async fn translate(&self, text: &str) -> Result<String> { Ok(text.to_uppercase()) }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let pipeline = TranslationPipeline::new(Arc::new(Upper));
//! let texts = vec!["abc".to_string(), String::new()];
//! let out = pipeline.translate_texts(&texts, &CancellationToken::new()).await?;
//! assert_eq!(out, vec!["ABC", ""]);
//! # Ok(())
//! # }
//! ```

use super::*;

/// Capability for translating a single text.
///
/// Implementations should bound every call with a timeout; a timeout is reported as an
/// error, which the pipeline treats as a per-item failure.
#[async_trait]
pub trait Translator: Send + Sync {
  /// Translates `text`, returning the translation only.
  async fn translate(&self, text: &str) -> Result<String>;
}

/// Outcome counts for a translated batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationReport {
  /// Items that received a non-empty translation
  pub translated: usize,
  /// Items whose backend call failed and were left empty
  pub failed:     usize,
}

/// Runs a [`Translator`] over batches of text.
#[derive(Clone)]
pub struct TranslationPipeline {
  /// Translator used for each item
  translator: Arc<dyn Translator>,
}

impl std::fmt::Debug for TranslationPipeline {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TranslationPipeline").finish_non_exhaustive()
  }
}

impl TranslationPipeline {
  /// Creates a pipeline over `translator`.
  pub fn new(translator: Arc<dyn Translator>) -> Self { Self { translator } }

  /// Translates `texts` in order, one output per input.
  ///
  /// # Errors
  ///
  /// Returns [`ArxnoteError::TranslationCancelled`] if `cancel` fires before the batch is
  /// done. Backend failures are not errors here; the item comes back empty.
  pub async fn translate_texts(
    &self,
    texts: &[String],
    cancel: &CancellationToken,
  ) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(texts.len());
    for (index, text) in texts.iter().enumerate() {
      if cancel.is_cancelled() {
        debug!("Translation cancelled before item {index}");
        return Err(ArxnoteError::TranslationCancelled);
      }
      out.push(self.translate_one(index, text).await.unwrap_or_default());
    }
    Ok(out)
  }

  /// Fills `abstract_ja` on each paper from its `abstract_text`.
  ///
  /// On cancellation, papers already processed keep their translation and the rest are
  /// left untouched.
  ///
  /// # Errors
  ///
  /// Returns [`ArxnoteError::TranslationCancelled`] if `cancel` fires before the batch is
  /// done.
  pub async fn translate_papers(
    &self,
    papers: &mut [Paper],
    cancel: &CancellationToken,
  ) -> Result<TranslationReport> {
    let mut report = TranslationReport::default();
    for (index, paper) in papers.iter_mut().enumerate() {
      if cancel.is_cancelled() {
        debug!("Translation cancelled before paper {} ({index})", paper.id);
        return Err(ArxnoteError::TranslationCancelled);
      }
      match self.translate_one(index, &paper.abstract_text).await {
        Some(translation) => {
          if !translation.is_empty() {
            report.translated += 1;
          }
          paper.abstract_ja = translation;
        },
        None => {
          report.failed += 1;
          paper.abstract_ja.clear();
        },
      }
    }
    info!("Translated {} paper(s), {} failure(s)", report.translated, report.failed);
    Ok(report)
  }

  /// Translates one item. `None` means the backend failed and the failure was logged.
  async fn translate_one(&self, index: usize, text: &str) -> Option<String> {
    if text.trim().is_empty() {
      return Some(String::new());
    }
    match self.translator.translate(text).await {
      Ok(translation) => Some(translation.trim().to_string()),
      Err(e) => {
        warn!("Translation of item {index} failed: {e}");
        None
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
  };

  use super::*;

  /// Prefixes its input, failing on texts containing "boom". Optionally cancels a token
  /// after a number of calls.
  #[derive(Default)]
  struct ScriptedTranslator {
    calls:        AtomicUsize,
    seen:         Mutex<Vec<String>>,
    cancel_after: Option<(usize, CancellationToken)>,
  }

  #[async_trait]
  impl Translator for ScriptedTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
      let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
      self.seen.lock().unwrap().push(text.to_string());
      if let Some((after, token)) = &self.cancel_after {
        if call >= *after {
          token.cancel();
        }
      }
      if text.contains("boom") {
        return Err(ArxnoteError::TranslationItemFailed("backend exploded".into()));
      }
      Ok(format!("ja:{text}"))
    }
  }

  fn texts(items: &[&str]) -> Vec<String> { items.iter().map(|s| s.to_string()).collect() }

  #[tokio::test]
  async fn test_empty_text_skips_backend() {
    let translator = Arc::new(ScriptedTranslator::default());
    let pipeline = TranslationPipeline::new(translator.clone());
    let out = pipeline.translate_texts(&texts(&[""]), &CancellationToken::new()).await.unwrap();
    assert_eq!(out, vec![""]);
    assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_order_is_preserved() {
    let pipeline = TranslationPipeline::new(Arc::new(ScriptedTranslator::default()));
    let out =
      pipeline.translate_texts(&texts(&["A", "B"]), &CancellationToken::new()).await.unwrap();
    assert_eq!(out, vec!["ja:A", "ja:B"]);
  }

  #[traced_test]
  #[tokio::test]
  async fn test_item_failure_is_absorbed() {
    let pipeline = TranslationPipeline::new(Arc::new(ScriptedTranslator::default()));
    let out = pipeline
      .translate_texts(&texts(&["A", "boom", "C"]), &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(out, vec!["ja:A", "", "ja:C"]);
    assert!(logs_contain("Translation of item 1 failed"));
  }

  #[tokio::test]
  async fn test_cancellation_stops_before_next_item() {
    let token = CancellationToken::new();
    let translator = Arc::new(ScriptedTranslator {
      cancel_after: Some((1, token.clone())),
      ..Default::default()
    });
    let pipeline = TranslationPipeline::new(translator.clone());

    let mut papers: Vec<Paper> = ["first", "second"]
      .iter()
      .map(|text| Paper { abstract_text: text.to_string(), ..Default::default() })
      .collect();
    let result = pipeline.translate_papers(&mut papers, &token).await;

    assert!(matches!(result, Err(ArxnoteError::TranslationCancelled)));
    assert_eq!(papers[0].abstract_ja, "ja:first");
    assert!(papers[1].abstract_ja.is_empty());
    assert_eq!(*translator.seen.lock().unwrap(), vec!["first"]);
  }

  #[tokio::test]
  async fn test_already_cancelled_makes_no_calls() {
    let token = CancellationToken::new();
    token.cancel();
    let translator = Arc::new(ScriptedTranslator::default());
    let pipeline = TranslationPipeline::new(translator.clone());
    let result = pipeline.translate_texts(&texts(&["A"]), &token).await;
    assert!(result.unwrap_err().is_cancellation());
    assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_report_counts() {
    let pipeline = TranslationPipeline::new(Arc::new(ScriptedTranslator::default()));
    let mut papers: Vec<Paper> = ["one", "", "boom"]
      .iter()
      .map(|text| Paper { abstract_text: text.to_string(), ..Default::default() })
      .collect();
    let report = pipeline.translate_papers(&mut papers, &CancellationToken::new()).await.unwrap();
    assert_eq!(report, TranslationReport { translated: 1, failed: 1 });
    assert_eq!(papers[0].abstract_ja, "ja:one");
    assert_eq!(papers[2].abstract_ja, "");
  }
}
