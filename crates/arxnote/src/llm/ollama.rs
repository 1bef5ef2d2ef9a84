//! Client implementation for translating with a local Ollama server.
//!
//! [`ChatRequest`] is a small builder over Ollama's `/api/chat` endpoint.
//! [`OllamaTranslator`] uses it to send the translation instruction as a system message
//! and the abstract as the user message.
//!
//! # Examples
//!
//! ```no_run
//! use arxnote::llm::ollama::ChatRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = reqwest::Client::new();
//! let response = ChatRequest::new()
//!   .with_host("http://localhost:11434")
//!   .with_model("llama3.2:3b")
//!   .with_system("Answer in one word.")
//!   .with_message("What is the capital of France?")
//!   .send(&client)
//!   .await?;
//! println!("Response: {}", response.message.content);
//! # Ok(())
//! # }
//! ```

use reqwest::Url;

use super::*;

/// Model used when the settings leave `model` empty.
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Address used when no host is configured.
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Path of the chat endpoint.
const CHAT_ENDPOINT: &str = "api/chat";

/// Request builder for the Ollama chat endpoint.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ChatRequest {
  /// Model to run. Sending without one is an error.
  pub model: String,

  /// Conversation messages, processed in order.
  pub messages: Vec<Message>,

  /// Always `false`; the reply is read as a single JSON object.
  pub stream: bool,

  /// Generation parameters.
  pub options: Options,

  /// Server base URL. Skipped during serialization.
  #[serde(skip)]
  pub host: Option<Url>,
}

/// A single chat message.
///
/// ```
/// use arxnote::llm::ollama::Message;
///
/// let message = Message { role: "user".to_string(), content: "Translate this".to_string() };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  /// `system`, `user` or `assistant`
  pub role: String,

  /// Message text
  pub content: String,
}

/// Generation parameters understood by Ollama.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
  /// Maximum number of tokens to generate
  pub num_predict: u32,
  /// Sampling temperature
  pub temperature: f64,
}

impl Default for Options {
  fn default() -> Self { Self { num_predict: 512, temperature: 1.0 } }
}

/// Response from the chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
  /// Name of the model used
  #[serde(default)]
  pub model:   String,
  /// Generated message
  pub message: Message,
  /// Whether generation is complete
  #[serde(default)]
  pub done:    bool,
}

impl ChatRequest {
  /// Creates a new request with default settings.
  pub fn new() -> Self { Self::default() }

  /// Sets the server address. An unparseable address is ignored with a warning.
  pub fn with_host(mut self, host: &str) -> Self {
    self.host = Url::parse(host).ok();
    if self.host.is_none() {
      warn!("Invalid Ollama host {host:?}, falling back to {DEFAULT_HOST}");
    }
    self
  }

  /// Sets the model to run.
  pub fn with_model(mut self, model: &str) -> Self {
    self.model = model.to_string();
    self
  }

  /// Adds a system message.
  pub fn with_system(mut self, content: &str) -> Self {
    self.messages.push(Message { role: "system".to_string(), content: content.to_string() });
    self
  }

  /// Adds a user message.
  pub fn with_message(mut self, content: &str) -> Self {
    self.messages.push(Message { role: "user".to_string(), content: content.to_string() });
    self
  }

  /// Replaces the generation parameters.
  pub fn with_options(mut self, options: Options) -> Self {
    self.options = options;
    self
  }

  /// Full URL of the chat endpoint.
  pub fn url(&self) -> Result<Url> {
    let base = match &self.host {
      Some(host) => host.clone(),
      None => {
        warn!("No host set, using {DEFAULT_HOST}");
        Url::parse(DEFAULT_HOST).map_err(|e| ArxnoteError::Config(e.to_string()))?
      },
    };
    base.join(CHAT_ENDPOINT).map_err(|e| ArxnoteError::Config(e.to_string()))
  }

  /// Sends the request with `client`.
  ///
  /// # Errors
  ///
  /// - [`ArxnoteError::Config`] if no model or no message is set
  /// - [`ArxnoteError::Network`] if the request fails or the reply cannot be decoded
  /// - [`ArxnoteError::TranslationItemFailed`] on a non-success status
  pub async fn send(&self, client: &reqwest::Client) -> Result<ChatResponse> {
    if self.model.is_empty() {
      return Err(ArxnoteError::Config("No Ollama model set".into()));
    }
    if self.messages.is_empty() {
      return Err(ArxnoteError::Config("No message to send to Ollama".into()));
    }

    let url = self.url()?;
    debug!("Sending chat request to {url}");
    let response = client.post(url).json(self).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(ArxnoteError::TranslationItemFailed(format!("Ollama returned {status}")));
    }
    Ok(response.json().await?)
  }
}

/// [`Translator`] using a model served by Ollama.
#[derive(Debug, Clone)]
pub struct OllamaTranslator {
  /// Internal web client, configured with the request timeout
  client:      reqwest::Client,
  /// Server address
  host:        String,
  /// Model name
  model:       String,
  /// Instruction sent as the system message
  instruction: String,
  /// Generation parameters
  options:     Options,
}

impl OllamaTranslator {
  /// Creates a translator from the translation settings.
  pub fn new(settings: &TranslationSettings) -> Result<Self> {
    let client =
      reqwest::Client::builder().timeout(Duration::from_secs(settings.timeout_secs)).build()?;
    let or_default = |value: &str, fallback: &str| {
      if value.is_empty() {
        fallback.to_string()
      } else {
        value.to_string()
      }
    };

    Ok(Self {
      client,
      host: or_default(&settings.host, DEFAULT_HOST),
      model: or_default(&settings.model, DEFAULT_MODEL),
      instruction: settings.system_prompt.clone(),
      options: Options { num_predict: settings.max_tokens, temperature: settings.temperature },
    })
  }

  /// Chat request for one text.
  fn request(&self, text: &str) -> ChatRequest {
    ChatRequest::new()
      .with_host(&self.host)
      .with_model(&self.model)
      .with_system(&self.instruction)
      .with_message(text)
      .with_options(self.options.clone())
  }
}

#[async_trait]
impl Translator for OllamaTranslator {
  async fn translate(&self, text: &str) -> Result<String> {
    let response = self.request(text).send(&self.client).await?;
    trace!("Ollama ({}) replied: {}", response.model, response.message.content);
    Ok(response.message.content)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[traced_test]
  #[test]
  fn test_url_fallback() {
    let request = ChatRequest::new().with_host("not a url");
    assert!(logs_contain("Invalid Ollama host"));
    assert_eq!(request.url().unwrap().as_str(), "http://localhost:11434/api/chat");
    assert!(logs_contain("No host set"));

    let request = ChatRequest::new().with_host("http://gpu-box:11434/");
    assert_eq!(request.url().unwrap().as_str(), "http://gpu-box:11434/api/chat");
  }

  #[test]
  fn test_request_shape() {
    let translator = OllamaTranslator::new(&TranslationSettings::default()).unwrap();
    let request = translator.request("Hello");
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["model"], DEFAULT_MODEL);
    assert_eq!(json["stream"], false);
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][1]["content"], "Hello");
    assert_eq!(json["options"]["num_predict"], 512);
    assert!(json.get("host").is_none());
  }

  #[tokio::test]
  async fn test_send_requires_model_and_message() {
    let client = reqwest::Client::new();
    let result = ChatRequest::new().with_message("hi").send(&client).await;
    assert!(matches!(result, Err(ArxnoteError::Config(_))));
    let result = ChatRequest::new().with_model(DEFAULT_MODEL).send(&client).await;
    assert!(matches!(result, Err(ArxnoteError::Config(_))));
  }

  #[ignore = "Can't run this in general -- relies on local LLM endpoint."]
  #[tokio::test]
  async fn test_live_translation() {
    let translator = OllamaTranslator::new(&TranslationSettings::default()).unwrap();
    let out = translator.translate("The capital of France is Paris.").await.unwrap();
    assert!(!out.is_empty());
  }
}
