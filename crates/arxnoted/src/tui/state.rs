//! State of the terminal interface.
//!
//! [`UIState`] is the [`Presenter`] the coordinator talks to: every presentation change
//! lands here and marks the screen for redraw. Key presses are turned into [`Action`]s,
//! which the event loop forwards to the coordinator.

use std::collections::HashSet;

use arxnote::{
  config::SearchSettings,
  coordinator::{Notice, Presentation, Presenter},
  paper::{Paper, SearchConfig},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

/// Screen currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
  /// The search form
  Request,
  /// Progress with a cancel key
  Loading {
    /// What is in progress
    message: String,
  },
  /// Result list and details
  Results,
  /// A failed search
  Error {
    /// What went wrong
    message: String,
  },
}

/// Fields of the search form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
  /// Comma-separated keywords, identifiers or URLs
  Keyword,
  /// Hits per query, 1 to 50
  MaxResults,
  /// Start date expression
  StartDate,
  /// End date expression
  EndDate,
}

impl FormField {
  /// Field after this one, wrapping around.
  fn next(self) -> Self {
    match self {
      Self::Keyword => Self::MaxResults,
      Self::MaxResults => Self::StartDate,
      Self::StartDate => Self::EndDate,
      Self::EndDate => Self::Keyword,
    }
  }

  /// Field before this one, wrapping around.
  fn previous(self) -> Self {
    match self {
      Self::Keyword => Self::EndDate,
      Self::MaxResults => Self::Keyword,
      Self::StartDate => Self::MaxResults,
      Self::EndDate => Self::StartDate,
    }
  }
}

/// Contents of the search form.
#[derive(Debug, Clone)]
pub struct RequestForm {
  /// Keyword input
  pub keyword:     String,
  /// Max results slider value
  pub max_results: usize,
  /// Start date input
  pub start_date:  String,
  /// End date input
  pub end_date:    String,
  /// Field receiving key presses
  pub focus:       FormField,
  /// Validation message from the last submit attempt
  pub error:       Option<String>,
}

impl RequestForm {
  /// Form prefilled from the configured defaults.
  pub fn new(settings: &SearchSettings) -> Self {
    Self {
      keyword:     String::new(),
      max_results: settings.max_results.clamp(1, SearchConfig::MAX_RESULTS_UI),
      start_date:  settings.start_date.clone(),
      end_date:    settings.end_date.clone(),
      focus:       FormField::Keyword,
      error:       None,
    }
  }

  /// Builds the request. Keywords are separated by commas.
  pub fn to_config(&self) -> arxnote::error::Result<SearchConfig> {
    let keywords = self.keyword.split(',').map(|k| k.trim().to_string()).collect();
    SearchConfig::new(keywords, self.max_results, self.start_date.trim(), self.end_date.trim())
  }

  /// Text buffer of the focused field, if it is a text field.
  fn focused_text(&mut self) -> Option<&mut String> {
    match self.focus {
      FormField::Keyword => Some(&mut self.keyword),
      FormField::StartDate => Some(&mut self.start_date),
      FormField::EndDate => Some(&mut self.end_date),
      FormField::MaxResults => None,
    }
  }

  /// Moves the max results value by `delta`, staying within 1 to 50.
  fn adjust_max_results(&mut self, delta: isize) {
    let value = self.max_results.saturating_add_signed(delta);
    self.max_results = value.clamp(1, SearchConfig::MAX_RESULTS_UI);
  }
}

/// Represents which pane currently has focus on the results screen.
#[derive(Debug, PartialEq, Eq)]
pub enum FocusedPane {
  /// The paper list on the left side is focused
  List,
  /// The paper details on the right side is focused
  Details,
}

/// Represents the current active dialog in the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogType {
  /// No dialog is currently active
  None,
  /// Showing the exit confirmation dialog
  ExitConfirm,
  /// Showing a notice after a save attempt
  Notice(Notice),
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  /// Nothing beyond redrawing
  None,
  /// Leave the application
  Quit,
  /// Start a search
  Submit(SearchConfig),
  /// Abandon the running request
  Cancel,
  /// Save the papers with these ids
  Save(Vec<String>),
  /// Return to the search form
  Back,
}

/// Maintains the complete state of the terminal interface.
pub struct UIState {
  /// Current screen
  pub view:            View,
  /// Search form contents
  pub form:            RequestForm,
  /// Papers on the results screen
  pub papers:          Vec<Paper>,
  /// Current selection state in the paper list
  pub selected:        ListState,
  /// Ids of papers marked for saving
  pub marked:          HashSet<String>,
  /// Current active dialog (if any)
  pub dialog:          DialogType,
  /// Which pane currently has focus
  pub focused_pane:    FocusedPane,
  /// Current scroll position in the details view
  pub scroll_position: usize,
  /// Maximum scroll position based on content
  pub max_scroll:      Option<usize>,
  /// Whether the UI needs to be redrawn
  pub needs_redraw:    bool,
  /// Status message to display
  pub status_message:  Option<String>,
}

impl Presenter for UIState {
  fn present(&mut self, presentation: Presentation) {
    match presentation {
      Presentation::Request => {
        self.view = View::Request;
        self.dialog = DialogType::None;
      },
      Presentation::Loading { message } => self.view = View::Loading { message },
      Presentation::Results(papers) => self.show_results(papers),
      Presentation::Error { message } => self.view = View::Error { message },
      Presentation::Notice(notice) => self.dialog = DialogType::Notice(notice),
    }
    self.needs_redraw = true;
  }

  fn set_status_message(&mut self, message: &str) {
    self.status_message = Some(message.to_string());
    self.needs_redraw = true;
  }
}

impl UIState {
  /// Creates the initial state showing the search form.
  pub fn new(settings: &SearchSettings) -> Self {
    Self {
      view:            View::Request,
      form:            RequestForm::new(settings),
      papers:          Vec::new(),
      selected:        ListState::default(),
      marked:          HashSet::new(),
      dialog:          DialogType::None,
      focused_pane:    FocusedPane::List,
      scroll_position: 0,
      max_scroll:      None,
      needs_redraw:    true,
      status_message:  None,
    }
  }

  /// Returns a reference to the currently selected paper.
  pub fn selected_paper(&self) -> Option<&Paper> {
    self.selected.selected().and_then(|i| self.papers.get(i))
  }

  /// Replaces the result list, keeping the selection and marks that still apply.
  fn show_results(&mut self, papers: Vec<Paper>) {
    let ids: HashSet<&str> = papers.iter().map(|p| p.id.as_str()).collect();
    self.marked.retain(|id| ids.contains(id.as_str()));

    let selected = match (self.selected.selected(), papers.len()) {
      (_, 0) => None,
      (Some(i), len) => Some(i.min(len - 1)),
      (None, _) => Some(0),
    };
    self.papers = papers;
    self.selected.select(selected);
    self.scroll_position = 0;
    self.view = View::Results;
  }

  /// Handles a key press and returns the resulting action.
  pub fn handle_input(&mut self, key: KeyEvent) -> Action {
    self.needs_redraw = true;
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Action::Quit;
    }

    match &self.dialog {
      DialogType::ExitConfirm => return self.handle_exit_dialog(key.code),
      DialogType::Notice(_) => {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
          self.dialog = DialogType::None;
        }
        return Action::None;
      },
      DialogType::None => {},
    }

    match self.view {
      View::Request => self.handle_form_input(key.code),
      View::Loading { .. } => match key.code {
        KeyCode::Esc | KeyCode::Char('c') => Action::Cancel,
        _ => Action::None,
      },
      View::Results => self.handle_results_input(key.code),
      View::Error { .. } => match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('b') => Action::Back,
        KeyCode::Char('q') => {
          self.dialog = DialogType::ExitConfirm;
          Action::None
        },
        _ => Action::None,
      },
    }
  }

  /// Handles input while the exit confirmation dialog is active.
  fn handle_exit_dialog(&mut self, key: KeyCode) -> Action {
    match key {
      KeyCode::Char('y') => Action::Quit,
      KeyCode::Char('n') | KeyCode::Esc => {
        self.dialog = DialogType::None;
        Action::None
      },
      _ => Action::None,
    }
  }

  /// Handles input on the search form.
  fn handle_form_input(&mut self, key: KeyCode) -> Action {
    match key {
      KeyCode::Esc => {
        self.dialog = DialogType::ExitConfirm;
        Action::None
      },
      KeyCode::Tab | KeyCode::Down => {
        self.form.focus = self.form.focus.next();
        Action::None
      },
      KeyCode::BackTab | KeyCode::Up => {
        self.form.focus = self.form.focus.previous();
        Action::None
      },
      KeyCode::Enter => match self.form.to_config() {
        Ok(config) => {
          self.form.error = None;
          Action::Submit(config)
        },
        Err(e) => {
          self.form.error = Some(e.to_string());
          Action::None
        },
      },
      KeyCode::Left if self.form.focus == FormField::MaxResults => {
        self.form.adjust_max_results(-1);
        Action::None
      },
      KeyCode::Right if self.form.focus == FormField::MaxResults => {
        self.form.adjust_max_results(1);
        Action::None
      },
      KeyCode::PageDown if self.form.focus == FormField::MaxResults => {
        self.form.adjust_max_results(-10);
        Action::None
      },
      KeyCode::PageUp if self.form.focus == FormField::MaxResults => {
        self.form.adjust_max_results(10);
        Action::None
      },
      KeyCode::Char(c) => {
        if let Some(text) = self.form.focused_text() {
          text.push(c);
        }
        Action::None
      },
      KeyCode::Backspace => {
        if let Some(text) = self.form.focused_text() {
          text.pop();
        }
        Action::None
      },
      _ => Action::None,
    }
  }

  /// Handles input on the results screen.
  ///
  /// Supports vim-style and arrow navigation, marking with space, saving and opening the
  /// selected paper in the browser.
  fn handle_results_input(&mut self, key: KeyCode) -> Action {
    match key {
      KeyCode::Char('q') => {
        self.dialog = DialogType::ExitConfirm;
        Action::None
      },
      KeyCode::Esc | KeyCode::Char('b') => Action::Back,
      KeyCode::Left | KeyCode::Char('h') => {
        self.focused_pane = FocusedPane::List;
        Action::None
      },
      KeyCode::Right | KeyCode::Char('l') => {
        self.focused_pane = FocusedPane::Details;
        Action::None
      },
      KeyCode::Up | KeyCode::Char('k') => {
        self.handle_up_navigation();
        Action::None
      },
      KeyCode::Down | KeyCode::Char('j') => {
        self.handle_down_navigation();
        Action::None
      },
      KeyCode::Char(' ') => {
        if let Some(id) = self.selected_paper().map(|p| p.id.clone()) {
          if !self.marked.remove(&id) {
            self.marked.insert(id);
          }
        }
        Action::None
      },
      KeyCode::Char('a') => {
        if self.marked.len() == self.papers.len() {
          self.marked.clear();
        } else {
          self.marked = self.papers.iter().map(|p| p.id.clone()).collect();
        }
        Action::None
      },
      KeyCode::Char('s') => Action::Save(
        self.papers.iter().filter(|p| self.marked.contains(&p.id)).map(|p| p.id.clone()).collect(),
      ),
      KeyCode::Char('o') => {
        if let Some(url) = self.selected_paper().map(|p| p.url.clone()) {
          self.open_in_browser(&url);
        }
        Action::None
      },
      _ => Action::None,
    }
  }

  /// Handles upward navigation in both list and details views.
  fn handle_up_navigation(&mut self) {
    match self.focused_pane {
      FocusedPane::List => {
        let i = self.selected.selected().unwrap_or(0);
        if i > 0 {
          self.selected.select(Some(i - 1));
          self.scroll_position = 0;
        }
      },
      FocusedPane::Details => self.scroll_position = self.scroll_position.saturating_sub(1),
    }
  }

  /// Handles downward navigation in both list and details views.
  fn handle_down_navigation(&mut self) {
    match self.focused_pane {
      FocusedPane::List => {
        let i = self.selected.selected().unwrap_or(0);
        if i < self.papers.len().saturating_sub(1) {
          self.selected.select(Some(i + 1));
          self.scroll_position = 0;
        }
      },
      FocusedPane::Details =>
        if let Some(max) = self.max_scroll {
          if self.scroll_position < max {
            self.scroll_position += 1;
          }
        },
    }
  }

  /// Updates the maximum scroll position for the details view.
  pub fn update_max_scroll(&mut self, available_lines: usize, visible_lines: usize) {
    self.max_scroll = Some(available_lines.saturating_sub(visible_lines));
  }

  /// Opens `url` with the platform's default handler.
  fn open_in_browser(&mut self, url: &str) {
    #[cfg(target_os = "windows")]
    let spawned = std::process::Command::new("cmd").args(["/C", "start", "", url]).spawn();
    #[cfg(target_os = "macos")]
    let spawned = std::process::Command::new("open").arg(url).spawn();
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let spawned = std::process::Command::new("xdg-open").arg(url).spawn();

    if let Err(e) = spawned {
      self.set_status_message(&format!("Could not open {url}: {e}"));
    }
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::KeyEventKind;

  use super::*;

  fn press(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn type_text(state: &mut UIState, text: &str) {
    for c in text.chars() {
      state.handle_input(press(KeyCode::Char(c)));
    }
  }

  fn paper(id: &str) -> Paper { Paper { id: id.into(), title: id.into(), ..Default::default() } }

  #[test]
  fn test_form_submit() {
    let mut state = UIState::new(&SearchSettings::default());
    type_text(&mut state, "2101.12345, graph neural networks");
    state.handle_input(press(KeyCode::Tab));
    state.handle_input(press(KeyCode::Right));
    state.handle_input(press(KeyCode::Right));

    let action = state.handle_input(press(KeyCode::Enter));
    let Action::Submit(config) = action else { panic!("expected submit, got {action:?}") };
    assert_eq!(config.keywords, vec!["2101.12345", "graph neural networks"]);
    assert_eq!(config.max_results, 7);
    assert_eq!(config.start_date, "0年1月0日前");
  }

  #[test]
  fn test_empty_keyword_is_rejected() {
    let mut state = UIState::new(&SearchSettings::default());
    assert_eq!(state.handle_input(press(KeyCode::Enter)), Action::None);
    assert!(state.form.error.is_some());
  }

  #[test]
  fn test_max_results_is_clamped() {
    let mut state = UIState::new(&SearchSettings::default());
    state.form.focus = FormField::MaxResults;
    for _ in 0..10 {
      state.handle_input(press(KeyCode::PageUp));
    }
    assert_eq!(state.form.max_results, 50);
    for _ in 0..10 {
      state.handle_input(press(KeyCode::PageDown));
    }
    assert_eq!(state.form.max_results, 1);
  }

  #[test]
  fn test_mark_and_save() {
    let mut state = UIState::new(&SearchSettings::default());
    state.present(Presentation::Results(vec![paper("a"), paper("b"), paper("c")]));
    assert_eq!(state.view, View::Results);

    state.handle_input(press(KeyCode::Char(' ')));
    state.handle_input(press(KeyCode::Down));
    state.handle_input(press(KeyCode::Down));
    state.handle_input(press(KeyCode::Char(' ')));
    assert_eq!(
      state.handle_input(press(KeyCode::Char('s'))),
      Action::Save(vec!["a".into(), "c".into()])
    );

    state.present(Presentation::Results(vec![paper("b")]));
    assert!(state.marked.is_empty());
    assert_eq!(state.selected.selected(), Some(0));
  }

  #[test]
  fn test_notice_is_dismissed() {
    let mut state = UIState::new(&SearchSettings::default());
    state.present(Presentation::Results(vec![paper("a")]));
    state.present(Presentation::Notice(Notice::NothingSelected));

    assert_eq!(state.handle_input(press(KeyCode::Char('s'))), Action::None);
    assert_eq!(state.dialog, DialogType::Notice(Notice::NothingSelected));
    state.handle_input(press(KeyCode::Enter));
    assert_eq!(state.dialog, DialogType::None);
  }

  #[test]
  fn test_loading_cancel_and_quit() {
    let mut state = UIState::new(&SearchSettings::default());
    state.present(Presentation::Loading { message: "Searching".into() });
    assert_eq!(state.handle_input(press(KeyCode::Esc)), Action::Cancel);

    let mut ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    ctrl_c.kind = KeyEventKind::Press;
    assert_eq!(state.handle_input(ctrl_c), Action::Quit);
  }
}
