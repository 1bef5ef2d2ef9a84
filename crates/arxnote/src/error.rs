//! Error types for the arxnote library.
//!
//! Every fallible operation in the crate returns [`ArxnoteError`]. The variants mirror the
//! places a request can go wrong:
//! - Date expressions the grammar cannot classify
//! - Search backend and network failures
//! - Translation cancellation and per-item translation failures
//! - Persistence configuration and per-item save failures
//! - Configuration file handling
//!
//! # Examples
//!
//! ```
//! use arxnote::{date::DateExpression, error::ArxnoteError};
//!
//! match "next tuesday".parse::<DateExpression>() {
//!   Err(ArxnoteError::UnparseableDateExpression(input)) => assert_eq!(input, "next tuesday"),
//!   other => panic!("unexpected: {other:?}"),
//! }
//! ```

use thiserror::Error;

/// Error type alias used for the [`arxnote`](crate) crate.
pub type Result<T> = core::result::Result<T, ArxnoteError>;

/// Errors that can occur while searching, translating or saving papers.
#[derive(Error, Debug)]
pub enum ArxnoteError {
  /// The date expression matched none of the supported forms.
  ///
  /// Supported forms are the empty string, `today`/`yesterday`, `-N[dmy]`, structured
  /// `Y years M months D days ago` / `Y年M月D日前` tokens and `YYYY-MM-DD` style dates.
  #[error("Unparseable date expression: {0:?}")]
  UnparseableDateExpression(String),

  /// A [`SearchConfig`](crate::paper::SearchConfig) violated one of its invariants.
  #[error("Invalid search configuration: {0}")]
  InvalidSearchConfig(String),

  /// The search backend failed or returned an error response.
  ///
  /// Not retried automatically; the message is shown to the user.
  #[error("Search failed: {0}")]
  SearchFailed(String),

  /// Translation was stopped by the cancellation token before the batch finished.
  ///
  /// Distinct from every other translation error: it aborts silently and leaves the
  /// translations produced so far in place.
  #[error("Translation was cancelled")]
  TranslationCancelled,

  /// A single translation request failed.
  ///
  /// Recovered by the pipeline: the item keeps an empty translation.
  #[error("Translation failed: {0}")]
  TranslationItemFailed(String),

  /// The persistence backend could not be initialized, usually because credentials are
  /// missing. No items are attempted.
  #[error("Persistence backend is not configured: {0}")]
  PersistenceConfig(String),

  /// A single paper could not be saved. Other papers are still attempted.
  #[error("Failed to save paper {id}: {reason}")]
  PersistenceItemFailed {
    /// Identifier of the paper that failed to save
    id:     String,
    /// Backend supplied reason
    reason: String,
  },

  /// A network request failed (connection, TLS, timeout, body decoding).
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// An external API returned a response that could not be interpreted.
  #[error("API error: {0}")]
  ApiError(String),

  /// Configuration is missing or inconsistent.
  #[error("{0}")]
  Config(String),

  /// A file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// The configuration file is not valid TOML for [`Config`](crate::Config).
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// The configuration could not be serialized.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// A JSON payload could not be encoded or decoded.
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl ArxnoteError {
  /// Whether this error is the cooperative cancellation signal rather than a failure.
  pub fn is_cancellation(&self) -> bool { matches!(self, Self::TranslationCancelled) }
}
