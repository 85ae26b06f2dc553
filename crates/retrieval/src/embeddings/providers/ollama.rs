//! Ollama Embedding Provider
//!
//! Semantic embeddings from a local Ollama server (e.g. `nomic-embed-text`).
//! Each batch is one `POST {endpoint}/api/embed` request.
//!
//! # Retry Strategy
//!
//! - Network errors, HTTP 429 and 5xx → retry with exponential backoff
//! - Any other HTTP error or an unparseable body → fail immediately
//!
//! Callers see either a full batch or [`AppError::EmbeddingUnavailable`].

use crate::embeddings::EmbeddingProvider;
use crate::types::Embedding;
use async_trait::async_trait;
use ragscope_core::config::EmbeddingSettings;
use ragscope_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const EMBED_ENDPOINT: &str = "/api/embed";

/// Maximum attempts per batch
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Ollama embedding provider using the local HTTP API
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    /// Ollama API base URL, without trailing slash
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Outcome of one failed request.
#[derive(Debug)]
enum BatchError {
    /// Worth another attempt
    Transient(AppError),
    Fatal(AppError),
}

impl BatchError {
    fn into_inner(self) -> AppError {
        match self {
            BatchError::Transient(e) | BatchError::Fatal(e) => e,
        }
    }
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

impl OllamaProvider {
    /// Build the provider. No request is made until the first batch.
    pub fn new(settings: &EmbeddingSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::embedding_unavailable("ollama", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, EMBED_ENDPOINT)
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_with_retries(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.send_batch(texts).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(BatchError::Transient(e)) if attempt < MAX_RETRIES => {
                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                    warn!(
                        "Embedding failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt, MAX_RETRIES, backoff_ms, e
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => return Err(e.into_inner()),
            }
        }
    }

    /// One request, no retries.
    async fn send_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, BatchError> {
        let url = self.url();
        debug!("Sending embedding request to {}", url);

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                BatchError::Transient(AppError::embedding_unavailable(
                    "ollama",
                    format!("request to {} failed: {}", self.base_url, e),
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|r| r.error)
                .unwrap_or(body);
            let err = AppError::embedding_unavailable(
                "ollama",
                format!("API error ({}): {}", status, message),
            );
            return Err(if is_retryable(status) {
                BatchError::Transient(err)
            } else {
                BatchError::Fatal(err)
            });
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            BatchError::Fatal(AppError::embedding_unavailable(
                "ollama",
                format!("failed to parse response: {}", e),
            ))
        })?;

        self.check_response(texts.len(), body.embeddings)
            .map_err(BatchError::Fatal)
    }

    fn check_response(&self, expected: usize, embeddings: Vec<Embedding>) -> AppResult<Vec<Embedding>> {
        if embeddings.len() != expected {
            return Err(AppError::EmbeddingCountMismatch {
                expected,
                found: embeddings.len(),
            });
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(AppError::DimensionMismatch {
                expected: self.dimensions,
                found: bad.len(),
                context: format!("ollama model '{}'", self.model),
            });
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        self.embed_with_retries(texts).await
    }
}
