//! Large language model translators.
//!
//! Two [`Translator`] implementations are provided:
//!
//! - [`gemini::GeminiTranslator`]: Google's hosted Gemini models over REST
//! - [`ollama::OllamaTranslator`]: any chat model served by a local Ollama instance
//!
//! Both send the configured instruction followed by a blank line and the abstract, and
//! return the model's reply verbatim. [`translator_from_settings`] picks one according to
//! [`TranslationSettings::backend`].

use super::*;
use crate::{
  config::{TranslationBackend, TranslationSettings},
  translate::Translator,
};

pub mod gemini;
pub mod ollama;

/// Builds the translator selected in `settings`, or `None` when translation is off.
///
/// # Errors
///
/// Returns [`ArxnoteError::Config`] if the Gemini backend is selected and
/// `GEMINI_API_KEY` is not set, and [`ArxnoteError::Network`] if an HTTP client cannot be
/// built.
pub fn translator_from_settings(
  settings: &TranslationSettings,
) -> Result<Option<Arc<dyn Translator>>> {
  let translator: Arc<dyn Translator> = match settings.backend {
    TranslationBackend::Gemini => Arc::new(gemini::GeminiTranslator::from_env(settings)?),
    TranslationBackend::Ollama => Arc::new(ollama::OllamaTranslator::new(settings)?),
    TranslationBackend::None => {
      debug!("Translation disabled");
      return Ok(None);
    },
  };
  Ok(Some(translator))
}

/// Joins the instruction and the text to translate into one prompt.
pub fn build_prompt(instruction: &str, text: &str) -> String { format!("{instruction}\n\n{text}") }
