//! Local answer generation through Ollama's `/api/chat`.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage, Message};
use ragscope_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<SamplingOptions>,
}

/// Ollama takes sampling settings in a nested `options` object.
#[derive(Debug, Serialize)]
struct SamplingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    message: Message,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn chat_request<'a>(request: &'a LlmRequest) -> ChatRequest<'a> {
        let options = match (request.temperature, request.max_tokens) {
            (None, None) => None,
            (temperature, num_predict) => Some(SamplingOptions {
                temperature,
                num_predict,
            }),
        };

        ChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options,
        }
    }

    fn into_response(chat: ChatResponse) -> LlmResponse {
        LlmResponse {
            content: chat.message.content,
            model: chat.model,
            usage: LlmUsage::from_counts(chat.prompt_eval_count, chat.eval_count),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    #[tracing::instrument(skip_all, fields(provider = "ollama", model = %request.model))]
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!("POST {} ({} messages)", url, request.messages.len());

        let response = self
            .http
            .post(&url)
            .json(&Self::chat_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Ollama unreachable at {}: {}", self.base_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!("Ollama returned {}: {}", status, body)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Unexpected Ollama chat response: {}", e)))?;

        let reply = Self::into_response(chat);
        tracing::info!("Ollama answered ({} tokens)", reply.usage.total_tokens);
        Ok(reply)
    }
}
