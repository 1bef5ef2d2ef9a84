//! Drawing and layout for the terminal interface.
//!
//! [`UIDrawer`] renders one frame from [`UIState`]: a one-line header, the current view,
//! a help bar listing the keys that work on that view, and any open dialog on top.

use arxnote::{coordinator::Notice, paper::Paper};
use ratatui::{
  layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
  Frame,
};

use super::{
  state::{DialogType, FocusedPane, FormField, UIState, View},
  styles,
};

/// Renders the UI for one frame.
///
/// Holds the frame being drawn and the state it is drawn from.
pub struct UIDrawer<'a, 'b> {
  /// Current frame, provided by ratatui's `Terminal::draw` callback
  frame: &'a mut Frame<'b>,
  /// State being rendered; scroll limits are written back
  state: &'a mut UIState,
}

impl<'a, 'b> UIDrawer<'a, 'b> {
  /// Creates a new drawer instance.
  pub fn new(frame: &'a mut Frame<'b>, state: &'a mut UIState) -> Self { Self { frame, state } }

  /// Main drawing entry point, handles the entire UI render.
  pub fn draw(&mut self) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
      .split(self.frame.area());

    self.draw_header(chunks[0]);
    match self.state.view.clone() {
      View::Request => self.draw_request_form(chunks[1]),
      View::Loading { message } => self.draw_loading(&message, chunks[1]),
      View::Results => self.draw_results(chunks[1]),
      View::Error { message } => self.draw_error(&message, chunks[1]),
    }
    self.draw_help_bar(chunks[2]);

    match self.state.dialog.clone() {
      DialogType::ExitConfirm => self.draw_exit_dialog(),
      DialogType::Notice(notice) => self.draw_notice(&notice),
      DialogType::None => {},
    }

    self.state.needs_redraw = false;
  }

  /// Draws the application name and the status message.
  fn draw_header(&mut self, area: Rect) {
    let mut spans = vec![Span::styled(" arxnote", styles::TITLE)];
    if let Some(status) = &self.state.status_message {
      spans.push(Span::styled("  ", styles::HELP));
      spans.push(Span::styled(status.clone(), styles::HELP));
    }
    self.frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }

  /// Draws the search form.
  fn draw_request_form(&mut self, area: Rect) {
    let block = Block::default()
      .title(Line::from(vec![
        Span::styled("🔎 ", Style::default().fg(Color::LightBlue)),
        Span::styled("Search arXiv", styles::TITLE),
      ]))
      .borders(Borders::ALL)
      .border_style(styles::border_style(true))
      .padding(Padding::new(2, 2, 1, 1));
    let inner = block.inner(area);
    self.frame.render_widget(block, area);

    let form = &self.state.form;
    let field = |label: &str, value: String, which: FormField| {
      let focused = form.focus == which;
      Line::from(vec![
        Span::styled(if focused { "▶ " } else { "  " }, styles::KEY_HIGHLIGHT),
        Span::styled(format!("{label:<12}"), styles::LABEL),
        Span::styled(value, if focused { styles::INPUT } else { styles::NORMAL }),
        Span::styled(if focused && which != FormField::MaxResults { "▏" } else { "" }, styles::INPUT),
      ])
    };

    let mut lines = vec![
      field("Keywords", form.keyword.clone(), FormField::Keyword),
      Line::from(Span::styled("              comma separated; arXiv ids and URLs welcome", styles::HELP)),
      Line::from(""),
      field("Max results", slider(form.max_results), FormField::MaxResults),
      Line::from(""),
      field("Start date", form.start_date.clone(), FormField::StartDate),
      field("End date", form.end_date.clone(), FormField::EndDate),
      Line::from(Span::styled(
        "              e.g. 0年1月0日前, 1 years 0 months 0 days ago, -30d, today, 2024-01-31",
        styles::HELP,
      )),
    ];
    if let Some(error) = &form.error {
      lines.push(Line::from(""));
      lines.push(Line::from(Span::styled(error.clone(), styles::ERROR)));
    }

    self.frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
  }

  /// Draws the progress screen.
  fn draw_loading(&mut self, message: &str, area: Rect) {
    let content = vec![
      Line::from(""),
      Line::from(Span::styled(message.to_string(), styles::TITLE)),
      Line::from(""),
      Line::from(vec![
        Span::styled("Press ", styles::HELP),
        Span::styled("Esc", styles::KEY_HIGHLIGHT.add_modifier(Modifier::BOLD)),
        Span::styled(" to cancel", styles::HELP),
      ]),
    ];
    let height = (content.len() as u16).min(area.height);
    let centered = Rect { y: area.y + (area.height - height) / 2, height, ..area };
    self.frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), centered);
  }

  /// Draws the failed-search screen.
  fn draw_error(&mut self, message: &str, area: Rect) {
    let block = Block::default()
      .title(Span::styled("Search failed", styles::ERROR.add_modifier(Modifier::BOLD)))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .padding(Padding::new(2, 2, 1, 1));
    let content = vec![
      Line::from(Span::styled(message.to_string(), Style::default().fg(Color::White))),
      Line::from(""),
      Line::from(vec![
        Span::styled("Press ", styles::HELP),
        Span::styled("Enter", styles::KEY_HIGHLIGHT.add_modifier(Modifier::BOLD)),
        Span::styled(" to return to the search form", styles::HELP),
      ]),
    ];
    self.frame.render_widget(Paragraph::new(content).block(block).wrap(Wrap { trim: true }), area);
  }

  /// Draws the result list and the details of the selected paper side by side.
  fn draw_results(&mut self, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
      .split(area);

    self.draw_paper_list(chunks[0]);
    match self.state.selected_paper().cloned() {
      Some(paper) => self.draw_paper_details(&paper, chunks[1]),
      None => {
        let empty = Paragraph::new(Span::styled("No papers matched the search.", styles::HELP))
          .alignment(Alignment::Center)
          .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false)));
        self.frame.render_widget(empty, chunks[1]);
      },
    }
  }

  /// Draws the paper list with mark indicators and counts in the title.
  fn draw_paper_list(&mut self, area: Rect) {
    let items: Vec<ListItem> = self
      .state
      .papers
      .iter()
      .map(|p| {
        let marked = self.state.marked.contains(&p.id);
        ListItem::new(Line::from(vec![
          Span::styled(if marked { "[x] " } else { "[ ] " }, styles::MARKED),
          Span::raw(p.title.clone()),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(
        Block::default()
          .title(Line::from(vec![
            Span::styled("📚 ", Style::default().fg(Color::LightBlue)),
            Span::styled("Results", styles::TITLE),
            Span::styled(
              format!(" ({}, {} marked)", self.state.papers.len(), self.state.marked.len()),
              styles::NORMAL,
            ),
          ]))
          .borders(Borders::ALL)
          .border_style(styles::border_style(self.state.focused_pane == FocusedPane::List)),
      )
      .highlight_style(styles::HIGHLIGHT)
      .highlight_symbol("▶ ");

    self.frame.render_stateful_widget(list, area, &mut self.state.selected);
  }

  /// Draws title, metadata and both abstracts of `paper`.
  fn draw_paper_details(&mut self, paper: &Paper, area: Rect) {
    let block = Block::default()
      .title(Line::from(vec![
        Span::styled("📄 ", Style::default().fg(Color::LightBlue)),
        Span::styled("Paper Details", styles::TITLE),
      ]))
      .borders(Borders::ALL)
      .border_style(styles::border_style(self.state.focused_pane == FocusedPane::Details))
      .padding(Padding::new(1, 1, 0, 0));
    let inner = block.inner(area);
    self.frame.render_widget(block, area);

    let published = paper.published_day().map_or_else(|| paper.published_date.clone(), |d| d.to_string());
    let mut lines = vec![
      Line::from(Span::styled(paper.title.clone(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
      Line::from(""),
      labelled("Authors: ", paper.author_line()),
      labelled("Published: ", published),
      labelled("Categories: ", paper.category.clone()),
      Line::from(vec![
        Span::styled("URL: ", styles::LABEL),
        Span::styled(paper.url.clone(), Style::default().fg(Color::LightYellow)),
      ]),
      Line::from(""),
      Line::from(Span::styled("要約:", styles::LABEL)),
    ];
    if paper.abstract_ja.is_empty() {
      lines.push(Line::from(Span::styled("(no translation)", styles::HELP)));
    } else {
      lines.push(Line::from(Span::styled(paper.abstract_ja.clone(), styles::TRANSLATION)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Abstract:", styles::LABEL)));
    lines.push(Line::from(Span::styled(normalize_whitespace(&paper.abstract_text), styles::NORMAL)));

    let total = lines.iter().map(|line| wrapped_height(line, inner.width)).sum();
    self.state.update_max_scroll(total, inner.height as usize);

    let details = Paragraph::new(lines)
      .wrap(Wrap { trim: true })
      .scroll((self.state.scroll_position as u16, 0));
    self.frame.render_widget(details, inner);
  }

  /// Draws the help bar for the current view.
  fn draw_help_bar(&mut self, area: Rect) {
    let keys: &[(&str, &str)] = match self.state.view {
      View::Request => &[("Tab", "next field"), ("←→", "max results"), ("Enter", "search"), ("Esc", "quit")],
      View::Loading { .. } => &[("Esc", "cancel")],
      View::Results => &[
        ("↑↓←→", "nav"),
        ("Space", "mark"),
        ("a", "all"),
        ("s", "save to Notion"),
        ("o", "open"),
        ("b", "back"),
        ("q", "quit"),
      ],
      View::Error { .. } => &[("Enter", "back"), ("q", "quit")],
    };

    let mut spans = Vec::new();
    for (index, (key, action)) in keys.iter().enumerate() {
      if index > 0 {
        spans.push(Span::styled(" • ", Style::default().fg(Color::Blue)));
      }
      spans.push(Span::styled(*key, styles::KEY_HIGHLIGHT.add_modifier(Modifier::BOLD)));
      spans.push(Span::styled(format!(":{action}"), styles::HELP));
    }
    self.frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }

  /// Draws the exit confirmation dialog.
  fn draw_exit_dialog(&mut self) {
    let content = vec![
      Line::from(Span::styled("Are you sure you want to quit?", Style::default().fg(Color::White))),
      Line::from(""),
      Line::from(vec![
        Span::styled("Press ", styles::HELP),
        Span::styled("y", styles::KEY_HIGHLIGHT.add_modifier(Modifier::BOLD)),
        Span::styled(" to confirm, ", styles::HELP),
        Span::styled("n", styles::KEY_HIGHLIGHT.add_modifier(Modifier::BOLD)),
        Span::styled(" to cancel", styles::HELP),
      ]),
    ];

    self.draw_dialog("Exit Confirmation", &content, Color::Red);
  }

  /// Draws the notice left by a save attempt.
  fn draw_notice(&mut self, notice: &Notice) {
    let (title, message, color) = match notice {
      Notice::NothingSelected =>
        ("Nothing Selected", "Mark papers with Space before saving.".to_string(), Color::Yellow),
      Notice::ConfigurationError(reason) =>
        ("Notion Not Configured", format!("Nothing was saved: {reason}"), Color::Red),
      Notice::Saved { saved, failed: 0 } =>
        ("Saved", format!("Saved {saved} paper(s) to Notion."), Color::Green),
      Notice::Saved { saved, failed } => (
        "Partially Saved",
        format!("Saved {saved} paper(s); {failed} failed and stay in the list."),
        Color::Yellow,
      ),
    };

    let content = vec![
      Line::from(Span::styled(message, Style::default().fg(Color::White))),
      Line::from(""),
      Line::from(vec![
        Span::styled("Press ", styles::HELP),
        Span::styled("Enter", styles::KEY_HIGHLIGHT.add_modifier(Modifier::BOLD)),
        Span::styled(" to continue", styles::HELP),
      ]),
    ];
    self.draw_dialog(title, &content, color);
  }

  /// Draws a centered dialog box with the given content.
  fn draw_dialog(&mut self, title: &str, content: &[Line], color: Color) {
    let area = self.frame.area();
    let dialog_box = create_dialog_box(title, content, area);

    self.frame.render_widget(Clear, dialog_box);
    self.frame.render_widget(
      Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(title, Style::default().fg(color).add_modifier(Modifier::BOLD))),
      dialog_box,
    );

    self.frame.render_widget(
      Paragraph::new(content.to_vec()).alignment(Alignment::Center).wrap(Wrap { trim: true }),
      dialog_box.inner(Margin { vertical: 1, horizontal: 2 }),
    );
  }
}

/// A `label: value` line.
fn labelled(label: &'static str, value: String) -> Line<'static> {
  Line::from(vec![Span::styled(label, styles::LABEL), Span::styled(value, styles::NORMAL)])
}

/// Text slider for the max results field.
fn slider(value: usize) -> String {
  let filled = value * 20 / 50;
  format!("{value:>2}  [{}{}]", "■".repeat(filled), "·".repeat(20 - filled))
}

/// Creates a centered dialog box sized to its content and clipped to the screen.
fn create_dialog_box(title: &str, content: &[Line], r: Rect) -> Rect {
  let content_width = content.iter().map(|line| line.width()).max().unwrap_or(0);
  let title_width = Span::raw(title).width();
  let width = (title_width.max(content_width).max(40) as u16 + 6).min(r.width);
  let height = (content.len() as u16 + 2).min(r.height);

  Rect {
    x: r.x + (r.width - width) / 2,
    y: r.y + (r.height - height) / 2,
    width,
    height,
  }
}

/// Normalizes whitespace in text for consistent display.
fn normalize_whitespace(text: &str) -> String { text.split_whitespace().collect::<Vec<_>>().join(" ") }

/// Rows a line takes when wrapped to `width` columns.
fn wrapped_height(line: &Line, width: u16) -> usize {
  let width = usize::from(width.max(1));
  line.width().max(1).div_ceil(width)
}
