//! LLM provider factory.

use crate::client::LlmClient;
use crate::providers::groq::DEFAULT_GROQ_URL;
use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use crate::providers::{GroqClient, OllamaClient};
use ragscope_core::config::LlmSettings;
use ragscope_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client from settings.
///
/// `api_key` is the already resolved secret; Groq requires one.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required key is
/// missing.
pub fn create_client(
    settings: &LlmSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let timeout = Duration::from_secs(settings.timeout_secs);

    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = settings.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
            Ok(Arc::new(OllamaClient::new(base_url, timeout)?))
        }
        "groq" => {
            let api_key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                AppError::Config(format!(
                    "Groq provider requires an API key. Set {}",
                    settings.api_key_env
                ))
            })?;
            let base_url = settings.endpoint.as_deref().unwrap_or(DEFAULT_GROQ_URL);
            Ok(Arc::new(GroqClient::new(base_url, api_key, timeout)?))
        }
        _ => Err(AppError::Config(format!(
            "Unknown LLM provider: {}. Supported: groq, ollama",
            settings.provider
        ))),
    }
}
