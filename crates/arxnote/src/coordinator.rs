//! Request lifecycle: search, translate, cancel and save, off the UI thread.
//!
//! [`RequestCoordinator`] is owned by the thread that drives the user interface. It starts
//! background tasks for searches and saves, and those tasks report back only by sending
//! [`Completion`] messages. The UI thread feeds the messages to
//! [`RequestCoordinator::handle`], which is the only place results are applied and views
//! are changed.
//!
//! Every submit, save and cancel bumps a generation counter. Completions carry the
//! generation they were started under, and anything from an older generation is dropped.
//! A superseded task also sees its [`CancellationToken`] fire and stops at its next poll.
//!
//! ```text
//!   Idle ──submit──▶ Searching ──phase──▶ Translating ──done──▶ Displaying
//!                        │                     │                   │
//!                        └───failure───▶ Error ◀──────────┘        save
//!                                                                   ▼
//!   Cancelling ◀──cancel── (any in-flight state)                  Saving
//! ```

use std::collections::HashSet;

use tokio::sync::{mpsc, OnceCell};

use super::*;
use crate::{notion::NotePersistenceBackend, search::SearchOrchestrator, translate::TranslationPipeline};

/// Status text shown while searching.
pub const SEARCHING_MESSAGE: &str = "Searching arXiv...";
/// Status text shown while translating.
pub const TRANSLATING_MESSAGE: &str = "Translating abstracts...";

/// Error text for a search task that stopped without a result.
pub const ABORTED_MESSAGE: &str = "Search stopped unexpectedly";

/// Builds the persistence backend on first use.
pub type PersistenceFactory =
  Arc<dyn Fn() -> Result<Arc<dyn NotePersistenceBackend>> + Send + Sync>;

/// What the user interface should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
  /// The search form
  Request,
  /// A progress view with a cancel action
  Loading {
    /// What is in progress
    message: String,
  },
  /// The result list
  Results(Vec<Paper>),
  /// A full-screen error with a return action
  Error {
    /// What went wrong
    message: String,
  },
  /// A dismissible notice over the current view
  Notice(Notice),
}

/// Notices shown over the results after a save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  /// Save was requested with nothing selected
  NothingSelected,
  /// The persistence backend could not be created; nothing was saved
  ConfigurationError(String),
  /// Summary of a finished save
  Saved {
    /// Papers saved
    saved:  usize,
    /// Papers that failed
    failed: usize,
  },
}

/// Receiver of view changes.
pub trait Presenter {
  /// Switches to, or overlays, `presentation`.
  fn present(&mut self, presentation: Presentation);

  /// Updates a transient status line. Optional.
  fn set_status_message(&mut self, _message: &str) {}
}

/// Where the coordinator is in the request lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinatorState {
  /// Nothing in flight; the request form is showing
  #[default]
  Idle,
  /// Waiting for the search backend
  Searching,
  /// Translating search results
  Translating,
  /// Results are showing
  Displaying,
  /// The user cancelled; waiting for the abandoned task to wind down
  Cancelling,
  /// Saving selected papers
  Saving,
  /// A search failed and the error view is showing
  Error,
}

/// Background phases announced before they start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  /// Search finished and translation began
  Translating,
}

/// Result of a save task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
  /// Ids saved successfully
  pub saved:       Vec<String>,
  /// Ids that failed to save
  pub failed:      Vec<String>,
  /// Set when the backend could not be created and nothing was attempted
  pub unavailable: Option<String>,
}

/// Message from a background task to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
  /// The task moved to a new phase
  Phase {
    /// Generation the task was started under
    generation: u64,
    /// Phase entered
    phase:      Phase,
  },
  /// Search and translation finished
  Searched {
    /// Generation the task was started under
    generation: u64,
    /// Result papers
    papers:     Vec<Paper>,
  },
  /// Search failed
  Failed {
    /// Generation the task was started under
    generation: u64,
    /// Description for the error view
    message:    String,
  },
  /// The task noticed cancellation and stopped
  Cancelled {
    /// Generation the task was started under
    generation: u64,
  },
  /// A save task ended, normally or not
  Saved {
    /// Generation the task was started under
    generation: u64,
    /// What was saved
    outcome:    SaveOutcome,
  },
}

impl Completion {
  /// Generation the originating task was started under.
  pub fn generation(&self) -> u64 {
    match self {
      Self::Phase { generation, .. }
      | Self::Searched { generation, .. }
      | Self::Failed { generation, .. }
      | Self::Cancelled { generation }
      | Self::Saved { generation, .. } => *generation,
    }
  }

  /// Whether this is the last message its task sends.
  pub fn is_terminal(&self) -> bool { !matches!(self, Self::Phase { .. }) }
}

/// Lazily built, shared persistence backend.
#[derive(Clone)]
struct PersistenceSlot {
  /// Constructor, run at most once successfully
  factory: PersistenceFactory,
  /// Backend once built
  cell:    Arc<OnceCell<Arc<dyn NotePersistenceBackend>>>,
}

impl PersistenceSlot {
  /// Returns the backend, building it on first call. A failed build is retried next time.
  async fn get(&self) -> Result<Arc<dyn NotePersistenceBackend>> {
    let factory = self.factory.clone();
    self.cell.get_or_try_init(|| async move { factory() }).await.cloned()
  }
}

/// Sends the terminal message of a search task when dropped. A task that unwinds before
/// producing one reports [`Completion::Failed`].
struct RequestGuard {
  /// Channel back to the UI thread
  tx:         mpsc::UnboundedSender<Completion>,
  /// Generation of the request
  generation: u64,
  /// Terminal message, once the request has one
  completion: Option<Completion>,
}

impl Drop for RequestGuard {
  fn drop(&mut self) {
    let generation = self.generation;
    let completion = self.completion.take().unwrap_or_else(|| {
      warn!("Search {generation} stopped without reporting");
      Completion::Failed { generation, message: ABORTED_MESSAGE.to_string() }
    });
    if self.tx.send(completion).is_err() {
      debug!("Coordinator gone before search {generation} reported");
    }
  }
}

/// Sends the [`Completion::Saved`] message when dropped, including during unwinding.
struct SaveGuard {
  /// Channel back to the UI thread
  tx:         mpsc::UnboundedSender<Completion>,
  /// Generation of the save
  generation: u64,
  /// Outcome accumulated so far
  outcome:    SaveOutcome,
}

impl Drop for SaveGuard {
  fn drop(&mut self) {
    let outcome = std::mem::take(&mut self.outcome);
    if self.tx.send(Completion::Saved { generation: self.generation, outcome }).is_err() {
      debug!("Coordinator gone before save {} reported", self.generation);
    }
  }
}

/// Drives searches and saves for a [`Presenter`].
pub struct RequestCoordinator<P: Presenter> {
  /// View receiving every presentation change
  presenter:   P,
  /// Search entry point
  search:      SearchOrchestrator,
  /// Translation, when enabled
  translation: Option<TranslationPipeline>,
  /// Persistence, when configured
  persistence: Option<PersistenceSlot>,
  /// Current lifecycle state
  state:       CoordinatorState,
  /// Generation of the newest request
  generation:  u64,
  /// Token of the newest request
  token:       CancellationToken,
  /// Background tasks that have not sent their terminal completion
  pending:     usize,
  /// Papers currently on display
  last_papers: Vec<Paper>,
  /// Sender handed to background tasks
  tx:          mpsc::UnboundedSender<Completion>,
  /// Receiver polled by the UI thread
  rx:          mpsc::UnboundedReceiver<Completion>,
}

impl<P: Presenter> std::fmt::Debug for RequestCoordinator<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RequestCoordinator")
      .field("state", &self.state)
      .field("generation", &self.generation)
      .field("pending", &self.pending)
      .field("papers", &self.last_papers.len())
      .finish_non_exhaustive()
  }
}

impl<P: Presenter> RequestCoordinator<P> {
  /// Creates an idle coordinator with no translation and no persistence.
  pub fn new(presenter: P, search: SearchOrchestrator) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      presenter,
      search,
      translation: None,
      persistence: None,
      state: CoordinatorState::Idle,
      generation: 0,
      token: CancellationToken::new(),
      pending: 0,
      last_papers: Vec::new(),
      tx,
      rx,
    }
  }

  /// Translates results with `pipeline` before they are shown.
  pub fn with_translation(mut self, pipeline: TranslationPipeline) -> Self {
    self.translation = Some(pipeline);
    self
  }

  /// Saves through the backend built by `factory` on the first save.
  pub fn with_persistence(mut self, factory: PersistenceFactory) -> Self {
    self.persistence = Some(PersistenceSlot { factory, cell: Arc::new(OnceCell::new()) });
    self
  }

  /// Current lifecycle state.
  pub fn state(&self) -> CoordinatorState { self.state }

  /// Papers currently on display.
  pub fn papers(&self) -> &[Paper] { &self.last_papers }

  /// The presenter.
  pub fn presenter(&self) -> &P { &self.presenter }

  /// The presenter, mutably.
  pub fn presenter_mut(&mut self) -> &mut P { &mut self.presenter }

  /// Whether any background task has yet to report back.
  pub fn is_busy(&self) -> bool { self.pending > 0 }

  /// Starts a new request and returns immediately.
  ///
  /// Any request still in flight is superseded: its token is cancelled and whatever it
  /// sends later is ignored. Must be called within a tokio runtime.
  pub fn submit(&mut self, config: SearchConfig) {
    let (generation, token) = self.start_generation();
    info!("Submitting search {generation}: {:?}", config.keywords);
    self.state = CoordinatorState::Searching;
    self.presenter.present(Presentation::Loading { message: SEARCHING_MESSAGE.to_string() });

    let search = self.search.clone();
    let translation = self.translation.clone();
    let tx = self.tx.clone();
    self.pending += 1;
    tokio::spawn(async move {
      let mut guard = RequestGuard { tx: tx.clone(), generation, completion: None };
      guard.completion =
        Some(run_request(generation, config, search, translation, &token, &tx).await);
    });
  }

  /// Cancels whatever is in flight and shows the request form.
  pub fn cancel(&mut self) {
    self.token.cancel();
    self.generation += 1;
    info!("Cancelled; now at generation {}", self.generation);
    self.presenter.present(Presentation::Request);
    self.presenter.set_status_message("Cancelled");
    self.state = if self.pending > 0 { CoordinatorState::Cancelling } else { CoordinatorState::Idle };
  }

  /// Leaves the results or error view for the request form.
  pub fn show_request(&mut self) {
    if self.pending > 0 {
      self.cancel();
      return;
    }
    self.presenter.present(Presentation::Request);
    self.state = CoordinatorState::Idle;
  }

  /// Saves the displayed papers whose id is in `ids`.
  ///
  /// Saved papers disappear from the results when the task reports back. Must be called
  /// within a tokio runtime.
  pub fn save_selected(&mut self, ids: &[String]) {
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let papers: Vec<Paper> =
      self.last_papers.iter().filter(|p| wanted.contains(p.id.as_str())).cloned().collect();
    if papers.is_empty() {
      self.presenter.present(Presentation::Notice(Notice::NothingSelected));
      return;
    }

    let (generation, token) = self.start_generation();
    info!("Saving {} paper(s) under generation {generation}", papers.len());
    self.state = CoordinatorState::Saving;
    self.presenter.present(Presentation::Loading {
      message: format!("Saving {} paper(s) to Notion...", papers.len()),
    });

    let persistence = self.persistence.clone();
    let tx = self.tx.clone();
    self.pending += 1;
    tokio::spawn(async move {
      let mut guard = SaveGuard { tx, generation, outcome: SaveOutcome::default() };
      let backend = match persistence {
        Some(slot) => slot.get().await,
        None => Err(ArxnoteError::PersistenceConfig("no persistence backend configured".into())),
      };
      let backend = match backend {
        Ok(backend) => backend,
        Err(e) => {
          warn!("Persistence unavailable: {e}");
          guard.outcome.unavailable = Some(e.to_string());
          return;
        },
      };

      for paper in papers {
        if token.is_cancelled() {
          debug!("Save {generation} cancelled before {}", paper.id);
          break;
        }
        match backend.create_entry(&paper).await {
          Ok(()) => guard.outcome.saved.push(paper.id),
          Err(e) => {
            warn!("Failed to save {}: {e}", paper.id);
            guard.outcome.failed.push(paper.id);
          },
        }
      }
    });
  }

  /// Waits for the next message from a background task.
  pub async fn next_completion(&mut self) -> Option<Completion> { self.rx.recv().await }

  /// Returns a waiting message without blocking.
  pub fn try_next_completion(&mut self) -> Option<Completion> { self.rx.try_recv().ok() }

  /// Applies a message from a background task.
  pub fn handle(&mut self, completion: Completion) {
    if completion.is_terminal() {
      self.pending = self.pending.saturating_sub(1);
    }

    if completion.generation() != self.generation {
      trace!("Dropping stale completion from generation {}", completion.generation());
      // Saved papers leave the results even when the save was superseded.
      if let Completion::Saved { outcome, .. } = &completion {
        if self.remove_saved(&outcome.saved) && self.state == CoordinatorState::Displaying {
          self.presenter.present(Presentation::Results(self.last_papers.clone()));
        }
      }
      if self.state == CoordinatorState::Cancelling && self.pending == 0 {
        self.state = CoordinatorState::Idle;
      }
      return;
    }

    match completion {
      Completion::Phase { phase: Phase::Translating, .. } => {
        self.state = CoordinatorState::Translating;
        self.presenter.present(Presentation::Loading { message: TRANSLATING_MESSAGE.to_string() });
      },
      Completion::Searched { papers, .. } => {
        info!("Displaying {} paper(s)", papers.len());
        self.last_papers = papers;
        self.state = CoordinatorState::Displaying;
        self.presenter.present(Presentation::Results(self.last_papers.clone()));
      },
      Completion::Failed { message, .. } => {
        self.state = CoordinatorState::Error;
        self.presenter.present(Presentation::Error { message });
      },
      Completion::Cancelled { .. } => {
        self.state = CoordinatorState::Idle;
      },
      Completion::Saved { outcome, .. } => {
        self.remove_saved(&outcome.saved);
        self.state = CoordinatorState::Displaying;
        self.presenter.present(Presentation::Results(self.last_papers.clone()));
        let notice = match outcome.unavailable {
          Some(reason) => Notice::ConfigurationError(reason),
          None => Notice::Saved { saved: outcome.saved.len(), failed: outcome.failed.len() },
        };
        self.presenter.present(Presentation::Notice(notice));
      },
    }
  }

  /// Supersedes the current request and returns the new generation and its token.
  fn start_generation(&mut self) -> (u64, CancellationToken) {
    self.token.cancel();
    self.token = CancellationToken::new();
    self.generation += 1;
    (self.generation, self.token.clone())
  }

  /// Drops papers whose id is in `saved` from the results. Returns whether any were dropped.
  fn remove_saved(&mut self, saved: &[String]) -> bool {
    if saved.is_empty() {
      return false;
    }
    let saved: HashSet<&str> = saved.iter().map(String::as_str).collect();
    let before = self.last_papers.len();
    self.last_papers.retain(|paper| !saved.contains(paper.id.as_str()));
    self.last_papers.len() != before
  }
}

/// Search then translate, as one background request.
async fn run_request(
  generation: u64,
  config: SearchConfig,
  search: SearchOrchestrator,
  translation: Option<TranslationPipeline>,
  token: &CancellationToken,
  tx: &mpsc::UnboundedSender<Completion>,
) -> Completion {
  let mut papers = match search.search(&config).await {
    Ok(papers) => papers,
    Err(e) => {
      warn!("Search {generation} failed: {e}");
      return Completion::Failed { generation, message: e.to_string() };
    },
  };
  if token.is_cancelled() {
    return Completion::Cancelled { generation };
  }

  if let Some(pipeline) = translation {
    // A closed channel means the coordinator is gone; the final send reports that.
    let _ = tx.send(Completion::Phase { generation, phase: Phase::Translating });
    match pipeline.translate_papers(&mut papers, token).await {
      Ok(_) => {},
      Err(e) if e.is_cancellation() => return Completion::Cancelled { generation },
      Err(e) => return Completion::Failed { generation, message: e.to_string() },
    }
  }

  if token.is_cancelled() {
    return Completion::Cancelled { generation };
  }
  Completion::Searched { generation, papers }
}
