//! Search requests, raw backend hits and result papers.
//!
//! A search flows through three shapes:
//!
//! - [`SearchConfig`]: what the user asked for, immutable once submitted
//! - [`RawHit`]: one entry as returned by a [`SearchBackend`](crate::search::SearchBackend)
//! - [`Paper`]: the result record shown to the user, translated and possibly saved
//!
//! # Examples
//!
//! ```
//! use arxnote::paper::{Paper, RawHit, SearchConfig};
//!
//! let request = SearchConfig::new(vec!["2101.12345".into()], 5, "", "").unwrap();
//! assert_eq!(request.max_results, 5);
//!
//! let hit = RawHit {
//!   id: "2101.12345v1".into(),
//!   title: "A Paper".into(),
//!   published: "2021-01-29T12:00:00Z".into(),
//!   ..Default::default()
//! };
//! let paper = Paper::from(hit);
//! assert_eq!(paper.published_date, "2021-01-29T12:00:00+00:00");
//! assert!(paper.abstract_ja.is_empty());
//! ```

use chrono::Utc;

use super::*;

/// Timestamp layout of the `published` field of a [`RawHit`].
pub const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A user-issued search request.
///
/// Built once from the request form and never mutated after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
  /// Search keywords in the order they were entered. Each is either an arXiv identifier or
  /// free text.
  pub keywords:    Vec<String>,
  /// Upper bound on hits requested from each backend query
  pub max_results: usize,
  /// Start of the date window as a date expression, empty for no lower bound
  pub start_date:  String,
  /// End of the date window as a date expression, empty for no upper bound
  pub end_date:    String,
}

impl SearchConfig {
  /// The largest `max_results` the request form offers.
  pub const MAX_RESULTS_UI: usize = 50;

  /// Builds a validated search request.
  ///
  /// Blank keywords are dropped. Date expressions are kept verbatim; they are resolved
  /// when the search runs, and may be given in either order.
  ///
  /// # Errors
  ///
  /// Returns [`ArxnoteError::InvalidSearchConfig`] if no keyword remains or `max_results`
  /// is zero.
  pub fn new(
    keywords: Vec<String>,
    max_results: usize,
    start_date: impl Into<String>,
    end_date: impl Into<String>,
  ) -> Result<Self> {
    let keywords: Vec<String> = keywords.into_iter().filter(|k| !k.trim().is_empty()).collect();
    if keywords.is_empty() {
      return Err(ArxnoteError::InvalidSearchConfig("at least one keyword is required".into()));
    }
    if max_results == 0 {
      return Err(ArxnoteError::InvalidSearchConfig("max_results must be at least 1".into()));
    }
    Ok(Self { keywords, max_results, start_date: start_date.into(), end_date: end_date.into() })
  }
}

/// One search hit as reported by a backend, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHit {
  /// Repository identifier of the entry
  pub id:        String,
  /// Entry title
  pub title:     String,
  /// Landing page link
  pub link:      String,
  /// Author names in listed order
  pub authors:   Vec<String>,
  /// Publication timestamp, normally `YYYY-MM-DDTHH:MM:SSZ`
  pub published: String,
  /// Category tags
  pub tags:      Vec<String>,
  /// Abstract text
  pub summary:   String,
}

impl RawHit {
  /// Parses the publication timestamp, or `None` if it is not in [`PUBLISHED_FORMAT`].
  pub fn published_at(&self) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(self.published.trim(), PUBLISHED_FORMAT).ok()
  }
}

/// A search result.
///
/// `id` is unique within one result set and keys deduplication, selection and save
/// tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
  /// Canonical arXiv identifier
  pub id:             String,
  /// Paper title
  pub title:          String,
  /// Landing page URL
  pub url:            String,
  /// Author names in listed order
  pub authors:        Vec<String>,
  /// ISO-8601 publication time, or the raw backend string when it could not be parsed
  pub published_date: String,
  /// Comma-joined category tags
  pub category:       String,
  /// Abstract in its original language
  #[serde(rename = "abstract")]
  pub abstract_text:  String,
  /// Translated abstract, empty until translation runs or when it failed
  pub abstract_ja:    String,
}

impl From<RawHit> for Paper {
  fn from(hit: RawHit) -> Self {
    let published_date = match hit.published_at() {
      Some(published) => published.and_utc().to_rfc3339(),
      None => hit.published.clone(),
    };

    Self {
      id: hit.id.trim().to_string(),
      title: hit.title.trim().to_string(),
      url: hit.link,
      authors: hit.authors,
      published_date,
      category: hit.tags.join(","),
      abstract_text: hit.summary.trim().to_string(),
      abstract_ja: String::new(),
    }
  }
}

impl Paper {
  /// Publication day in UTC, when the stored date is ISO-8601.
  pub fn published_day(&self) -> Option<NaiveDate> {
    chrono::DateTime::parse_from_rfc3339(&self.published_date)
      .ok()
      .map(|dt| dt.with_timezone(&Utc).date_naive())
  }

  /// Authors joined for display, `"A, B, C"`.
  pub fn author_line(&self) -> String { self.authors.join(", ") }
}
