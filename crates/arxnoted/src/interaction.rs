//! Console output and prompts for the command line front-end.

use console::{Emoji, Style};
use dialoguer::{theme::ColorfulTheme, Confirm};

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for user prompts
pub static PROMPT_PREFIX: &str = "❯ ";
/// Prefix for list items
pub static ITEM_PREFIX: &str = "├─";
/// Prefix for the last list item
pub static LAST_ITEM_PREFIX: &str = "└─";
/// Continuation line for tree structure
pub static CONTINUE_PREFIX: &str = "│  ";
/// Blank continuation after the last item
pub static LAST_CONTINUE_PREFIX: &str = "   ";

/// Something to tell the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// One paper with full details
  Paper(&'a Paper),
  /// A summary list of papers
  Papers(&'a [Paper]),
  /// A completed action
  Success(&'a str),
  /// Something worth knowing
  Info(&'a str),
  /// A recoverable problem
  Warning(&'a str),
}

/// Interaction with the user on the terminal.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str) -> Result<bool>;
  /// Prints `content`.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

impl UserInteraction for Cli {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      return Ok(true);
    }
    Ok(
      Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{}{message}", Emoji(PROMPT_PREFIX, "> ")))
        .default(false)
        .interact()?,
    )
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Paper(paper) => print_paper(paper, true),
      ResponseContent::Papers(papers) => {
        println!(
          "{} Found {} paper(s)",
          style(Emoji(INFO_PREFIX, "i ")).blue(),
          style(papers.len()).bold()
        );
        for (index, paper) in papers.iter().enumerate() {
          print_paper(paper, index + 1 == papers.len());
        }
      },
      ResponseContent::Success(message) =>
        println!("{} {}", style(Emoji(SUCCESS_PREFIX, "ok ")).green(), style(message).green()),
      ResponseContent::Info(message) =>
        println!("{} {}", style(Emoji(INFO_PREFIX, "i ")).blue(), message),
      ResponseContent::Warning(message) =>
        eprintln!("{} {}", style(Emoji(WARNING_PREFIX, "! ")).yellow(), style(message).yellow()),
    }
    Ok(())
  }
}

/// Prints one paper as a tree entry with its translated summary.
fn print_paper(paper: &Paper, last: bool) {
  let (branch, indent) =
    if last { (LAST_ITEM_PREFIX, LAST_CONTINUE_PREFIX) } else { (ITEM_PREFIX, CONTINUE_PREFIX) };
  let label = Style::new().dim();

  println!("{branch} {}", style(&paper.title).bold());
  println!("{indent}{} {}", label.apply_to("ID:"), style(&paper.id).yellow());
  println!("{indent}{} {}", label.apply_to("Authors:"), paper.author_line());
  let published = match paper.published_day() {
    Some(day) => day.to_string(),
    None => paper.published_date.clone(),
  };
  println!("{indent}{} {}", label.apply_to("Published:"), published);
  if !paper.category.is_empty() {
    println!("{indent}{} {}", label.apply_to("Categories:"), paper.category);
  }
  println!("{indent}{} {}", label.apply_to("URL:"), style(&paper.url).underlined());
  if !paper.abstract_ja.is_empty() {
    println!("{indent}{} {}", label.apply_to("要約:"), style(&paper.abstract_ja).cyan());
  }
  println!("{indent}");
}
