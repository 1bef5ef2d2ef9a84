//! On-disk configuration.
//!
//! Settings live in a TOML file, by default `<config dir>/arxnote/config.toml`. Every
//! section and field has a default, so a missing or partial file is fine. Credentials are
//! never stored here; they come from the environment:
//!
//! - `GEMINI_API_KEY` for the Gemini translator
//! - `NOTION_API_KEY` and `NOTION_DATABASE_ID` for Notion
//!
//! ```toml
//! [search]
//! max_results = 10
//! start_date  = "-7d"
//!
//! [translation]
//! backend = "ollama"
//! model   = "llama3.2:3b"
//! ```

use super::*;

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Environment variable holding the Notion integration token.
pub const NOTION_API_KEY: &str = "NOTION_API_KEY";
/// Environment variable holding the target Notion database id.
pub const NOTION_DATABASE_ID: &str = "NOTION_DATABASE_ID";

/// Default instruction given to the translation model.
pub const DEFAULT_SYSTEM_PROMPT: &str =
  "以下の英文を日本語に翻訳し、100字以内に要約した結果のみを出力してください。";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// arXiv search settings and request form defaults
  pub search:      SearchSettings,
  /// Translation backend settings
  pub translation: TranslationSettings,
  /// Notion settings
  pub notion:      NotionSettings,
}

/// Settings for the arXiv backend and the request form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
  /// arXiv API query endpoint
  pub endpoint:     String,
  /// Initial value of the max results field
  pub max_results:  usize,
  /// Timeout applied to each arXiv request, in seconds
  pub timeout_secs: u64,
  /// Initial start date expression
  pub start_date:   String,
  /// Initial end date expression
  pub end_date:     String,
}

impl Default for SearchSettings {
  fn default() -> Self {
    Self {
      endpoint:     "http://export.arxiv.org/api/query".to_string(),
      max_results:  5,
      timeout_secs: 20,
      start_date:   "0年1月0日前".to_string(),
      end_date:     "0年0月0日前".to_string(),
    }
  }
}

/// Which service translates abstracts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationBackend {
  /// Google Gemini over its REST API
  #[default]
  Gemini,
  /// A local Ollama server
  Ollama,
  /// No translation; `abstract_ja` stays empty
  None,
}

impl FromStr for TranslationBackend {
  type Err = ArxnoteError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "gemini" => Ok(Self::Gemini),
      "ollama" => Ok(Self::Ollama),
      "none" | "off" => Ok(Self::None),
      other => Err(ArxnoteError::Config(format!("Unknown translation backend: {other}"))),
    }
  }
}

/// Settings for the translation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
  /// Backend to use
  pub backend:       TranslationBackend,
  /// Model name; the backend's default is used when empty
  pub model:         String,
  /// Instruction placed before each abstract
  pub system_prompt: String,
  /// Sampling temperature
  pub temperature:   f64,
  /// Maximum tokens per translation
  pub max_tokens:    u32,
  /// Ollama server address
  pub host:          String,
  /// Timeout applied to each translation request, in seconds
  pub timeout_secs:  u64,
}

impl Default for TranslationSettings {
  fn default() -> Self {
    Self {
      backend:       TranslationBackend::Gemini,
      model:         String::new(),
      system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
      temperature:   1.0,
      max_tokens:    512,
      host:          "http://localhost:11434".to_string(),
      timeout_secs:  60,
    }
  }
}

/// Settings for the Notion backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionSettings {
  /// Value of the `Notion-Version` header
  pub notion_version: String,
  /// Status given to new entries in the `Progress` property
  pub status_name:    String,
  /// Timeout applied to each Notion request, in seconds
  pub timeout_secs:   u64,
}

impl Default for NotionSettings {
  fn default() -> Self {
    Self {
      notion_version: "2022-06-28".to_string(),
      status_name:    "未読".to_string(),
      timeout_secs:   20,
    }
  }
}

impl Config {
  /// Default location of the configuration file.
  ///
  /// Falls back to `./arxnote/config.toml` when the platform has no config directory.
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("arxnote").join("config.toml")
  }

  /// Directory for log files written while the terminal UI owns the screen.
  pub fn log_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(std::env::temp_dir).join("arxnote").join("logs")
  }

  /// Loads the configuration at `path`, or the defaults if the file does not exist.
  ///
  /// # Errors
  ///
  /// Returns [`ArxnoteError::Io`] if the file exists but cannot be read and
  /// [`ArxnoteError::TomlDe`] if it is not valid.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if !path.exists() {
      debug!("No config at {}, using defaults", path.display());
      return Ok(Self::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: Self = toml::from_str(&content)?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
  }

  /// Writes the configuration to `path`, creating parent directories.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    info!("Saved config to {}", path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;

  #[test]
  fn test_missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load(dir.path().join("nope.toml")).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.search.max_results, 5);
    assert_eq!(config.search.start_date, "0年1月0日前");
    assert_eq!(config.translation.system_prompt, DEFAULT_SYSTEM_PROMPT);
    assert_eq!(config.notion.notion_version, "2022-06-28");
  }

  #[test]
  fn test_partial_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
      &path,
      "[search]\nmax_results = 12\n\n[translation]\nbackend = \"ollama\"\nmodel = \"llama3.2:3b\"\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.search.max_results, 12);
    assert_eq!(config.search.timeout_secs, 20);
    assert_eq!(config.translation.backend, TranslationBackend::Ollama);
    assert_eq!(config.translation.model, "llama3.2:3b");
    assert_eq!(config.notion, NotionSettings::default());
  }

  #[test]
  fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut config = Config::default();
    config.translation.backend = TranslationBackend::None;
    config.search.end_date = "today".into();

    config.save(&path).unwrap();
    assert_eq!(Config::load(&path).unwrap(), config);
  }

  #[test]
  fn test_invalid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[search\nmax_results = ").unwrap();
    assert!(matches!(Config::load(&path), Err(ArxnoteError::TomlDe(_))));
  }

  #[test]
  fn test_backend_from_str() {
    assert_eq!("Gemini".parse::<TranslationBackend>().unwrap(), TranslationBackend::Gemini);
    assert_eq!("off".parse::<TranslationBackend>().unwrap(), TranslationBackend::None);
    assert!("deepl".parse::<TranslationBackend>().is_err());
  }
}
