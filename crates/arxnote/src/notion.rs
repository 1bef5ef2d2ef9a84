//! Filing papers into a Notion database.
//!
//! Each saved paper becomes one page in the configured database with these properties:
//!
//! | Property   | Type      | Value                             |
//! |------------|-----------|-----------------------------------|
//! | `名前`     | title     | paper title                       |
//! | `Progress` | status    | configured status, `未読` default |
//! | `Authors`  | rich text | authors joined with `", "`        |
//! | `Time`     | rich text | publication date                  |
//! | `URL`      | url       | landing page                      |

use serde_json::{json, Value};

use super::*;
use crate::config::{NotionSettings, NOTION_API_KEY, NOTION_DATABASE_ID};

/// Endpoint creating a page.
pub const PAGES_ENDPOINT: &str = "https://api.notion.com/v1/pages";

/// Capability for persisting a paper as a note.
///
/// Constructors of implementations fail with [`ArxnoteError::PersistenceConfig`] when
/// credentials are missing, before any paper is attempted.
#[async_trait]
pub trait NotePersistenceBackend: Send + Sync {
  /// Creates one entry for `paper`.
  ///
  /// # Errors
  ///
  /// Returns [`ArxnoteError::PersistenceItemFailed`] if the entry was not created.
  async fn create_entry(&self, paper: &Paper) -> Result<()>;
}

/// Notion REST client bound to one database.
#[derive(Clone)]
pub struct NotionClient {
  /// Internal web client, configured with the request timeout
  client:      reqwest::Client,
  /// Integration token
  api_key:     String,
  /// Target database id
  database_id: String,
  /// Header and property settings
  settings:    NotionSettings,
}

impl std::fmt::Debug for NotionClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("NotionClient")
      .field("database_id", &self.database_id)
      .field("settings", &self.settings)
      .finish_non_exhaustive()
  }
}

impl NotionClient {
  /// Creates a client for `database_id`.
  ///
  /// # Errors
  ///
  /// Returns [`ArxnoteError::PersistenceConfig`] if the key or database id is empty.
  pub fn new(
    api_key: impl Into<String>,
    database_id: impl Into<String>,
    settings: &NotionSettings,
  ) -> Result<Self> {
    let api_key = api_key.into();
    let database_id = database_id.into();
    if api_key.trim().is_empty() {
      return Err(ArxnoteError::PersistenceConfig(format!("{NOTION_API_KEY} is not set")));
    }
    if database_id.trim().is_empty() {
      return Err(ArxnoteError::PersistenceConfig(format!("{NOTION_DATABASE_ID} is not set")));
    }

    let client =
      reqwest::Client::builder().timeout(Duration::from_secs(settings.timeout_secs)).build()?;
    Ok(Self { client, api_key, database_id, settings: settings.clone() })
  }

  /// Creates a client from `NOTION_API_KEY` and `NOTION_DATABASE_ID`.
  pub fn from_env(settings: &NotionSettings) -> Result<Self> {
    Self::new(
      std::env::var(NOTION_API_KEY).unwrap_or_default(),
      std::env::var(NOTION_DATABASE_ID).unwrap_or_default(),
      settings,
    )
  }

  /// Request body creating a page for `paper`.
  pub fn page_body(&self, paper: &Paper) -> Value {
    json!({
      "parent": { "database_id": self.database_id },
      "properties": page_properties(paper, &self.settings.status_name),
    })
  }
}

#[async_trait]
impl NotePersistenceBackend for NotionClient {
  async fn create_entry(&self, paper: &Paper) -> Result<()> {
    debug!("Creating Notion page for {}", paper.id);
    let failed = |reason: String| ArxnoteError::PersistenceItemFailed { id: paper.id.clone(), reason };

    let response = self
      .client
      .post(PAGES_ENDPOINT)
      .bearer_auth(&self.api_key)
      .header("Notion-Version", &self.settings.notion_version)
      .json(&self.page_body(paper))
      .send()
      .await
      .map_err(|e| failed(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
      info!("Saved {} to Notion", paper.id);
      return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    trace!("Notion error body: {body}");
    Err(failed(notion_error_message(status, &body)))
  }
}

/// Database properties for one paper.
pub fn page_properties(paper: &Paper, status_name: &str) -> Value {
  json!({
    "名前": { "title": [{ "text": { "content": paper.title } }] },
    "Progress": { "status": { "name": status_name } },
    "Authors": { "rich_text": [{ "text": { "content": paper.author_line() } }] },
    "Time": { "rich_text": [{ "text": { "content": paper.published_date } }] },
    "URL": { "url": paper.url },
  })
}

/// Human readable reason from a Notion error response.
fn notion_error_message(status: reqwest::StatusCode, body: &str) -> String {
  serde_json::from_str::<Value>(body)
    .ok()
    .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
    .map_or_else(|| format!("Notion returned {status}"), |message| format!("{status}: {message}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn paper() -> Paper {
    Paper {
      id: "2101.12345".into(),
      title: "Attention".into(),
      url: "http://arxiv.org/abs/2101.12345".into(),
      authors: vec!["Ada".into(), "Grace".into()],
      published_date: "2021-01-29T18:30:05+00:00".into(),
      ..Default::default()
    }
  }

  #[test]
  fn test_missing_credentials() {
    let settings = NotionSettings::default();
    assert!(matches!(
      NotionClient::new("", "db", &settings),
      Err(ArxnoteError::PersistenceConfig(message)) if message.contains(NOTION_API_KEY)
    ));
    assert!(matches!(
      NotionClient::new("secret", " ", &settings),
      Err(ArxnoteError::PersistenceConfig(message)) if message.contains(NOTION_DATABASE_ID)
    ));
  }

  #[test]
  fn test_page_properties() {
    let properties = page_properties(&paper(), "未読");
    assert_eq!(properties["名前"]["title"][0]["text"]["content"], "Attention");
    assert_eq!(properties["Progress"]["status"]["name"], "未読");
    assert_eq!(properties["Authors"]["rich_text"][0]["text"]["content"], "Ada, Grace");
    assert_eq!(properties["Time"]["rich_text"][0]["text"]["content"], "2021-01-29T18:30:05+00:00");
    assert_eq!(properties["URL"]["url"], "http://arxiv.org/abs/2101.12345");
  }

  #[test]
  fn test_page_body_targets_database() {
    let client = NotionClient::new("secret", "db-123", &NotionSettings::default()).unwrap();
    let body = client.page_body(&paper());
    assert_eq!(body["parent"]["database_id"], "db-123");
    assert!(body["properties"].get("URL").is_some());
    assert!(!format!("{client:?}").contains("secret"));
  }

  #[test]
  fn test_error_message() {
    let body = r#"{"object":"error","status":400,"message":"URL is not a valid url."}"#;
    assert_eq!(
      notion_error_message(reqwest::StatusCode::BAD_REQUEST, body),
      "400 Bad Request: URL is not a valid url."
    );
    assert_eq!(
      notion_error_message(reqwest::StatusCode::BAD_GATEWAY, "<html>"),
      "Notion returned 502 Bad Gateway"
    );
  }
}
