//! Colors and text styles shared by the terminal views.

use ratatui::style::{Color, Modifier, Style};

/// Help text and secondary information.
pub const HELP: Style = Style::new().fg(Color::DarkGray);

/// The selected list entry.
pub const HIGHLIGHT: Style =
  Style::new().bg(Color::DarkGray).fg(Color::LightCyan).add_modifier(Modifier::BOLD);

/// Keyboard shortcuts.
pub const KEY_HIGHLIGHT: Style = Style::new().fg(Color::Yellow);

/// Field labels.
pub const LABEL: Style = Style::new().fg(Color::LightBlue);

/// Regular text.
pub const NORMAL: Style = Style::new().fg(Color::Gray);

/// Section titles.
pub const TITLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);

/// Text being typed into the focused form field.
pub const INPUT: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);

/// Validation and failure messages.
pub const ERROR: Style = Style::new().fg(Color::LightRed);

/// Mark boxes in the result list.
pub const MARKED: Style = Style::new().fg(Color::LightGreen);

/// Translated abstract.
pub const TRANSLATION: Style = Style::new().fg(Color::LightYellow);

/// Border style for a pane, brighter when it has focus.
pub fn border_style(focused: bool) -> Style {
  if focused {
    Style::default().fg(Color::LightBlue)
  } else {
    Style::default().fg(Color::Blue)
  }
}
