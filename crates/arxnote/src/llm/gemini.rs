//! Translator backed by the Gemini `generateContent` REST endpoint.
//!
//! # Examples
//!
//! ```no_run
//! use arxnote::{config::TranslationSettings, llm::gemini::GeminiTranslator, translate::Translator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let translator = GeminiTranslator::new("my-api-key", &TranslationSettings::default())?;
//! let summary = translator.translate("We propose a new attention mechanism.").await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

use serde_json::json;

use super::*;
use crate::config::GEMINI_API_KEY;

/// Model used when the settings leave `model` empty.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Base URL of the Gemini REST API.
pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// [`Translator`] calling a Gemini model.
#[derive(Clone)]
pub struct GeminiTranslator {
  /// Internal web client, configured with the request timeout
  client:      reqwest::Client,
  /// API key sent as `x-goog-api-key`
  api_key:     String,
  /// Model name, e.g. `gemini-1.5-flash`
  model:       String,
  /// Instruction placed before each text
  instruction: String,
  /// Sampling temperature
  temperature: f64,
  /// Output token cap
  max_tokens:  u32,
}

impl std::fmt::Debug for GeminiTranslator {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GeminiTranslator")
      .field("model", &self.model)
      .field("temperature", &self.temperature)
      .field("max_tokens", &self.max_tokens)
      .finish_non_exhaustive()
  }
}

/// Subset of the `generateContent` response this client reads.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
  /// Generated candidates, best first
  #[serde(default)]
  candidates: Vec<Candidate>,
}

/// One generated candidate.
#[derive(Debug, Deserialize)]
struct Candidate {
  /// Candidate content, absent when the candidate was blocked
  content: Option<Content>,
}

/// Content made of text parts.
#[derive(Debug, Deserialize)]
struct Content {
  /// Text parts in order
  #[serde(default)]
  parts: Vec<Part>,
}

/// A single text part.
#[derive(Debug, Deserialize)]
struct Part {
  /// Part text
  #[serde(default)]
  text: String,
}

impl GeminiTranslator {
  /// Creates a translator with an explicit API key.
  ///
  /// # Errors
  ///
  /// Returns [`ArxnoteError::Config`] if `api_key` is empty.
  pub fn new(api_key: impl Into<String>, settings: &TranslationSettings) -> Result<Self> {
    let api_key = api_key.into();
    if api_key.trim().is_empty() {
      return Err(ArxnoteError::Config(format!("{GEMINI_API_KEY} is not set")));
    }
    let client =
      reqwest::Client::builder().timeout(Duration::from_secs(settings.timeout_secs)).build()?;
    let model =
      if settings.model.is_empty() { DEFAULT_MODEL.to_string() } else { settings.model.clone() };

    Ok(Self {
      client,
      api_key,
      model,
      instruction: settings.system_prompt.clone(),
      temperature: settings.temperature,
      max_tokens: settings.max_tokens,
    })
  }

  /// Creates a translator reading the key from `GEMINI_API_KEY`.
  pub fn from_env(settings: &TranslationSettings) -> Result<Self> {
    Self::new(std::env::var(GEMINI_API_KEY).unwrap_or_default(), settings)
  }

  /// Request body for one prompt.
  fn body(&self, text: &str) -> serde_json::Value {
    json!({
      "contents": [{ "role": "user", "parts": [{ "text": build_prompt(&self.instruction, text) }] }],
      "generationConfig": { "temperature": self.temperature, "maxOutputTokens": self.max_tokens },
    })
  }
}

#[async_trait]
impl Translator for GeminiTranslator {
  async fn translate(&self, text: &str) -> Result<String> {
    let url = format!("{API_BASE}/models/{}:generateContent", self.model);
    debug!("Requesting translation from {url}");

    let response = self
      .client
      .post(&url)
      .header("x-goog-api-key", &self.api_key)
      .json(&self.body(text))
      .send()
      .await?;
    let status = response.status();
    let body = response.text().await?;
    trace!("Gemini response ({status}): {body}");

    if !status.is_success() {
      return Err(ArxnoteError::TranslationItemFailed(format!("Gemini returned {status}")));
    }
    extract_text(&body)
  }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String> {
  let response: GenerateResponse = serde_json::from_str(body)?;
  response
    .candidates
    .into_iter()
    .next()
    .and_then(|candidate| candidate.content)
    .map(|content| content.parts.into_iter().map(|part| part.text).collect::<String>())
    .ok_or_else(|| ArxnoteError::TranslationItemFailed("Gemini returned no candidates".into()))
}
