//! Terminal input as an async stream.
//!
//! Crossterm's reader blocks, so polling runs on a blocking thread and forwards events
//! over a channel that the event loop can `select!` on alongside request completions.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;
use tracing::warn;

/// Events that can occur in the application
#[derive(Debug)]
pub enum Event {
  /// Key press events
  Key(KeyEvent),
  /// Terminal resize events
  Resize(u16, u16),
}

/// Forwards terminal events from a polling thread.
pub struct EventHandler {
  /// Receiver half of event channel
  rx: mpsc::Receiver<Event>,
}

impl EventHandler {
  /// Starts polling the terminal every `poll_interval`.
  ///
  /// The polling thread exits once the handler is dropped.
  pub fn new(poll_interval: Duration) -> Self {
    let (tx, rx) = mpsc::channel(100);

    tokio::task::spawn_blocking(move || {
      while !tx.is_closed() {
        let ready = match event::poll(poll_interval) {
          Ok(ready) => ready,
          Err(e) => {
            warn!("Terminal poll failed: {e}");
            break;
          },
        };
        if !ready {
          continue;
        }

        let forwarded = match event::read() {
          Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
          Ok(CrosstermEvent::Resize(width, height)) => Some(Event::Resize(width, height)),
          Ok(_) => None,
          Err(e) => {
            warn!("Terminal read failed: {e}");
            break;
          },
        };
        if let Some(event) = forwarded {
          if tx.blocking_send(event).is_err() {
            break;
          }
        }
      }
    });

    Self { rx }
  }

  /// Receives the next event, or `None` once polling has stopped.
  pub async fn next(&mut self) -> Option<Event> { self.rx.recv().await }
}
