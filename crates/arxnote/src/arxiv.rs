//! [`SearchBackend`] over the arXiv Atom API.
//!
//! Identifier lookups use the `id_list` parameter and free-text searches use
//! `search_query` with one `abs:` clause per term joined by `OR`. Both are sorted by
//! submission date, newest first. Responses are Atom feeds, read with `quick-xml`.
//!
//! # Examples
//!
//! ```no_run
//! use arxnote::{arxiv::ArxivClient, config::SearchSettings, search::SearchBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArxivClient::new(&SearchSettings::default())?;
//! let hits = client.query_by_text(&["diffusion models".to_string()], 5).await?;
//! for hit in hits {
//!   println!("{} {}", hit.id, hit.title);
//! }
//! # Ok(())
//! # }
//! ```

use quick_xml::{
  events::{BytesStart, Event},
  Reader,
};

use super::*;
use crate::{config::SearchSettings, identifier::extract_identifier, search::SearchBackend};

/// Longest `id_list` value sent in one request, in bytes.
pub const MAX_ID_LIST_LEN: usize = 2048;

/// Client for the arXiv query API.
#[derive(Debug, Clone)]
pub struct ArxivClient {
  /// Internal web client, configured with the request timeout
  client:   reqwest::Client,
  /// Query endpoint, `http://export.arxiv.org/api/query` by default
  endpoint: String,
}

impl ArxivClient {
  /// Creates a client from the search settings.
  ///
  /// # Errors
  ///
  /// Returns [`ArxnoteError::Network`] if the HTTP client cannot be built.
  pub fn new(settings: &SearchSettings) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(settings.timeout_secs))
      .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, endpoint: settings.endpoint.clone() })
  }

  /// Sends one query and parses the resulting feed.
  async fn fetch(&self, params: &[(&str, String)]) -> Result<Vec<RawHit>> {
    debug!("Fetching from arXiv via {} with {:?}", self.endpoint, params);

    let response = self.client.get(&self.endpoint).query(params).send().await?;
    let status = response.status();
    let body = response.text().await?;
    trace!("arXiv response ({status}): {body}");

    if !status.is_success() {
      return Err(ArxnoteError::SearchFailed(format!("arXiv returned {status}")));
    }
    parse_feed(&body)
  }
}

#[async_trait]
impl SearchBackend for ArxivClient {
  async fn query_by_id(&self, ids: &[String], limit: usize) -> Result<Vec<RawHit>> {
    self.fetch(&query_params("id_list", id_list(ids), limit)).await
  }

  async fn query_by_text(&self, terms: &[String], limit: usize) -> Result<Vec<RawHit>> {
    self.fetch(&query_params("search_query", text_query(terms), limit)).await
  }
}

/// Full parameter list for one query: the selector plus paging and newest-first ordering.
fn query_params(selector: &'static str, value: String, limit: usize) -> Vec<(&'static str, String)> {
  vec![
    (selector, value),
    ("start", "0".into()),
    ("max_results", limit.to_string()),
    ("sortBy", "submittedDate".into()),
    ("sortOrder", "descending".into()),
  ]
}

/// Joins identifiers for the `id_list` parameter, truncated to [`MAX_ID_LIST_LEN`] bytes.
pub fn id_list(ids: &[String]) -> String {
  let mut joined = ids.join(",");
  if joined.len() > MAX_ID_LIST_LEN {
    let mut cut = MAX_ID_LIST_LEN;
    while !joined.is_char_boundary(cut) {
      cut -= 1;
    }
    joined.truncate(cut);
  }
  joined
}

/// Builds the `search_query` value: one `abs:` clause per term, joined with `OR`.
///
/// Terms containing whitespace are quoted so they match as a phrase.
pub fn text_query(terms: &[String]) -> String {
  terms
    .iter()
    .map(|term| {
      let term = term.trim().replace('"', "");
      if term.contains(char::is_whitespace) {
        format!("abs:\"{term}\"")
      } else {
        format!("abs:{term}")
      }
    })
    .collect::<Vec<_>>()
    .join(" OR ")
}

/// Parses an arXiv Atom feed into raw hits.
///
/// Entry ids are reduced from `http://arxiv.org/abs/<id>` to the bare identifier. A feed
/// whose only entry is titled `Error` is the API's way of reporting a bad query and is
/// turned into [`ArxnoteError::SearchFailed`].
pub fn parse_feed(xml: &str) -> Result<Vec<RawHit>> {
  let mut reader = Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  let mut hits = Vec::new();
  let mut current: Option<RawHit> = None;
  let mut path: Vec<String> = Vec::new();

  loop {
    match reader.read_event() {
      Ok(Event::Start(e)) => {
        let name = local_name(&e);
        if name == "entry" {
          current = Some(RawHit::default());
        } else if let Some(hit) = current.as_mut() {
          read_attributes(hit, &name, &e);
        }
        path.push(name);
      },
      Ok(Event::Empty(e)) =>
        if let Some(hit) = current.as_mut() {
          read_attributes(hit, &local_name(&e), &e);
        },
      Ok(Event::Text(e)) =>
        if let Some(hit) = current.as_mut() {
          let text = e
            .unescape()
            .map_err(|e| ArxnoteError::ApiError(format!("Failed to parse XML: {e}")))?;
          read_text(hit, &path, &text);
        },
      Ok(Event::End(_)) =>
        if path.pop().as_deref() == Some("entry") {
          if let Some(mut hit) = current.take() {
            if let Some(id) = extract_identifier(&hit.id) {
              hit.id = id;
            }
            hits.push(hit);
          }
        },
      Ok(Event::Eof) => break,
      Ok(_) => {},
      Err(e) => return Err(ArxnoteError::ApiError(format!("Failed to parse XML: {e}"))),
    }
  }

  if let [only] = hits.as_slice() {
    if only.title == "Error" {
      return Err(ArxnoteError::SearchFailed(only.summary.clone()));
    }
  }
  Ok(hits)
}

/// Element name without its namespace prefix.
fn local_name(e: &BytesStart<'_>) -> String {
  String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Reads a named attribute, unescaped.
fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
  e.try_get_attribute(name)
    .ok()
    .flatten()
    .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Picks up the attribute-only parts of an entry: the landing link and category tags.
fn read_attributes(hit: &mut RawHit, name: &str, e: &BytesStart<'_>) {
  match name {
    "link" => {
      let rel = attribute(e, "rel");
      if hit.link.is_empty() && matches!(rel.as_deref(), None | Some("alternate")) {
        if let Some(href) = attribute(e, "href") {
          hit.link = href;
        }
      }
    },
    "category" =>
      if let Some(term) = attribute(e, "term") {
        if !hit.tags.contains(&term) {
          hit.tags.push(term);
        }
      },
    _ => {},
  }
}

/// Stores element text according to its position inside the entry.
fn read_text(hit: &mut RawHit, path: &[String], text: &str) {
  let Some(entry_at) = path.iter().rposition(|name| name == "entry") else {
    return;
  };
  match &path[entry_at + 1..] {
    [field] if field == "id" => hit.id = text.to_string(),
    [field] if field == "title" => hit.title = normalize_whitespace(text),
    [field] if field == "summary" => hit.summary = text.to_string(),
    [field] if field == "published" => hit.published = text.to_string(),
    [author, name] if author == "author" && name == "name" => hit.authors.push(text.to_string()),
    _ => {},
  }
}

/// Collapses runs of whitespace, including the line breaks arXiv puts in long titles.
fn normalize_whitespace(text: &str) -> String { text.split_whitespace().collect::<Vec<_>>().join(" ") }
