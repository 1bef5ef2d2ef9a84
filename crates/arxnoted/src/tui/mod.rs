//! Terminal user interface for arxnote.
//!
//! The interface has four screens: a search form, a progress screen that can be cancelled
//! with `Esc`, the results (paper list on the left, details with the translated and original
//! abstract on the right) and an error screen. Papers are marked with `Space` and filed into
//! Notion with `s`.
//!
//! All requests run through a [`RequestCoordinator`] owning the [`UIState`] as its
//! presenter. The event loop waits on terminal input and on coordinator completions at the
//! same time, so the screen never blocks on the network.
//!
//! # Notes
//! The TUI is enabled through the "tui" feature flag. When enabled, it becomes
//! the default interface when no command is specified.

use std::{io, sync::Arc, time::Duration};

use arxnote::{
  arxiv::ArxivClient,
  coordinator::{Completion, PersistenceFactory, Presenter, RequestCoordinator},
  error::Result as ArxnoteResult,
  llm::translator_from_settings,
  notion::{NotePersistenceBackend, NotionClient},
  search::SearchOrchestrator,
  translate::TranslationPipeline,
  Config,
};
use crossterm::{
  execute,
  terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info, warn};

use self::{
  event::{Event, EventHandler},
  state::{Action, UIState},
  ui::UIDrawer,
};
use crate::error::Result;

mod event;
mod state;
mod styles;
mod ui;

/// Terminal type the interface draws to.
type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// What woke the event loop.
enum Wake {
  /// Terminal input, or `None` once input has stopped
  Input(Option<Event>),
  /// A message from a background request
  Completion(Option<Completion>),
}

/// Runs the terminal interface until the user quits.
///
/// A translator that cannot be built is reported in the status line and the interface runs
/// without translation. Notion credentials are only read when the first save happens.
///
/// The terminal is restored to its original state when the function returns, regardless of
/// how it exits.
///
/// # Errors
///
/// Returns an error if the search client cannot be built, or if terminal setup or drawing
/// fails.
pub async fn run(config: Config) -> Result<()> {
  let search = SearchOrchestrator::new(Arc::new(ArxivClient::new(&config.search)?));
  let mut coordinator = RequestCoordinator::new(UIState::new(&config.search), search);

  match translator_from_settings(&config.translation) {
    Ok(Some(translator)) =>
      coordinator = coordinator.with_translation(TranslationPipeline::new(translator)),
    Ok(None) => {},
    Err(e) => {
      warn!("Running without translation: {e}");
      coordinator.presenter_mut().set_status_message(&format!("Translation off: {e}"));
    },
  }

  let notion = config.notion.clone();
  let factory: PersistenceFactory = Arc::new(move || -> ArxnoteResult<Arc<dyn NotePersistenceBackend>> {
    Ok(Arc::new(NotionClient::from_env(&notion)?))
  });
  let mut coordinator = coordinator.with_persistence(factory);

  enable_raw_mode()?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen)?;
  let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

  let mut events = EventHandler::new(Duration::from_millis(100));
  let result = event_loop(&mut terminal, &mut coordinator, &mut events).await;

  // Cleanup
  disable_raw_mode()?;
  execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
  terminal.show_cursor()?;

  result
}

/// Draws, then waits for input or a completion, until the user quits.
async fn event_loop(
  terminal: &mut Tui,
  coordinator: &mut RequestCoordinator<UIState>,
  events: &mut EventHandler,
) -> Result<()> {
  loop {
    if coordinator.presenter().needs_redraw {
      terminal.draw(|frame| UIDrawer::new(frame, coordinator.presenter_mut()).draw())?;
    }

    let wake = tokio::select! {
      event = events.next() => Wake::Input(event),
      completion = coordinator.next_completion() => Wake::Completion(completion),
    };

    match wake {
      Wake::Input(Some(Event::Key(key))) => {
        let action = coordinator.presenter_mut().handle_input(key);
        if apply(coordinator, action) {
          break;
        }
      },
      Wake::Input(Some(Event::Resize(width, height))) => {
        debug!("Terminal resized to {width}x{height}");
        coordinator.presenter_mut().needs_redraw = true;
      },
      Wake::Input(None) => {
        warn!("Terminal input stopped");
        break;
      },
      Wake::Completion(Some(completion)) => coordinator.handle(completion),
      Wake::Completion(None) => {},
    }
  }

  Ok(())
}

/// Forwards `action` to the coordinator. Returns `true` when the application should exit.
fn apply(coordinator: &mut RequestCoordinator<UIState>, action: Action) -> bool {
  match action {
    Action::None => {},
    Action::Quit => {
      if coordinator.is_busy() {
        coordinator.cancel();
      }
      info!("Quitting");
      return true;
    },
    Action::Submit(config) => coordinator.submit(config),
    Action::Cancel => coordinator.cancel(),
    Action::Save(ids) => coordinator.save_selected(&ids),
    Action::Back => coordinator.show_request(),
  }
  false
}
