//! arXiv search, abstract translation and Notion filing.
//!
//! `arxnote` is the engine behind the `arxnote` terminal application. It provides:
//!
//! - Keyword and identifier search against the arXiv API
//! - Relative and absolute date-range filtering
//! - Machine translation of abstracts (Gemini or a local Ollama model)
//! - Filing selected papers into a Notion database
//! - A request coordinator that runs all of the above off the UI thread with cooperative
//!   cancellation
//!
//! # Getting Started
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use arxnote::{
//!   arxiv::ArxivClient,
//!   paper::SearchConfig,
//!   search::SearchOrchestrator,
//!   Config,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let orchestrator = SearchOrchestrator::new(Arc::new(ArxivClient::new(&config.search)?));
//!
//! let request = SearchConfig::new(vec!["quantum error correction".into()], 5, "-30d", "today")?;
//! for paper in orchestrator.search(&request).await? {
//!   println!("{} ({})", paper.title, paper.id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`date`]: Date expression grammar and range normalization
//! - [`identifier`]: arXiv identifier extraction and keyword partitioning
//! - [`paper`]: Search requests, raw backend hits and result papers
//! - [`search`]: The [`search::SearchBackend`] capability and the orchestrator
//! - [`arxiv`]: The arXiv Atom API backend
//! - [`translate`]: The [`translate::Translator`] capability and the translation pipeline
//! - [`llm`]: Gemini and Ollama translators
//! - [`notion`]: The [`notion::NotePersistenceBackend`] capability and Notion client
//! - [`coordinator`]: The request/cancel/save lifecycle
//! - [`config`]: On-disk configuration

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
  sync::Arc,
  time::Duration,
};

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
#[cfg(test)] use tracing_test::traced_test;

pub mod arxiv;
pub mod config;
pub mod coordinator;
pub mod date;
pub mod error;
pub mod identifier;
pub mod llm;
pub mod notion;
pub mod paper;
pub mod search;
pub mod translate;

pub use crate::config::Config;
use crate::{error::*, paper::*};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use arxnote::prelude::*;
///
/// fn describe(error: &ArxnoteError) -> String { error.to_string() }
/// ```
pub mod prelude {
  pub use crate::{
    coordinator::Presenter, error::ArxnoteError, notion::NotePersistenceBackend,
    search::SearchBackend, translate::Translator,
  };
}
