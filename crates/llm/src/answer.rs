//! Grounded answer generation from an assembled context.

use crate::client::{LlmClient, LlmRequest};
use handlebars::Handlebars;
use ragscope_core::config::LlmSettings;
use ragscope_core::{AppError, AppResult};
use serde_json::json;

/// System prompt sent with every answer request.
pub const ANSWER_SYSTEM_PROMPT: &str = "You answer questions using only the context provided by the user. \
If the context does not contain the answer, say that you could not find it in the documents. \
Do not mention the context, chunks or retrieval in your answer.";

const ANSWER_TEMPLATE: &str = "Context:
{{context}}

Question: {{query}}

Answer:";

/// Render the user prompt for `query` over `context`.
pub fn build_answer_prompt(query: &str, context: &str) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text prompt, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("answer", ANSWER_TEMPLATE)
        .map_err(|e| AppError::Llm(format!("Failed to register answer template: {}", e)))?;

    handlebars
        .render("answer", &json!({ "query": query, "context": context }))
        .map_err(|e| AppError::Llm(format!("Failed to render answer template: {}", e)))
}

/// Ask `client` to answer `query` from `context`.
///
/// Refuses an empty context instead of letting the model answer ungrounded.
pub async fn generate_answer(
    client: &dyn LlmClient,
    settings: &LlmSettings,
    query: &str,
    context: &str,
) -> AppResult<String> {
    if context.trim().is_empty() {
        return Err(AppError::Llm(
            "No context to answer from: retrieval selected no text".to_string(),
        ));
    }

    tracing::debug!(
        "Generating answer with {} (model: {}, context: {} chars)",
        client.provider_name(),
        settings.model,
        context.chars().count()
    );

    let request = LlmRequest::new(&settings.model)
        .system(ANSWER_SYSTEM_PROMPT)
        .user(build_answer_prompt(query, context)?)
        .temperature(settings.temperature)
        .max_tokens(settings.max_tokens);

    let response = client.complete(&request).await?;
    Ok(response.content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LlmResponse, LlmUsage, Role};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingClient {
        last: Mutex<Option<LlmRequest>>,
    }

    #[async_trait::async_trait]
    impl LlmClient for RecordingClient {
        fn provider_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            *self.last.lock().unwrap() = Some(request.clone());
            Ok(LlmResponse {
                content: "  Paris.\n".to_string(),
                model: request.model.clone(),
                usage: LlmUsage::from_counts(10, 2),
            })
        }
    }

    #[test]
    fn test_build_answer_prompt() {
        let prompt = build_answer_prompt("What is the capital?", "Paris is the capital").unwrap();
        assert_eq!(
            prompt,
            "Context:\nParis is the capital\n\nQuestion: What is the capital?\n\nAnswer:"
        );
    }

    #[test]
    fn test_build_answer_prompt_does_not_escape() {
        let prompt = build_answer_prompt("a < b & c?", "<tag> \"quoted\"").unwrap();
        assert!(prompt.contains("<tag> \"quoted\""));
        assert!(prompt.contains("a < b & c?"));
    }

    #[tokio::test]
    async fn test_generate_answer_sends_settings() {
        let client = RecordingClient::default();
        let settings = LlmSettings::default();

        let answer = generate_answer(&client, &settings, "Capital?", "Paris is the capital.")
            .await
            .unwrap();

        assert_eq!(answer, "Paris.");
        let request = client.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, settings.model);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, ANSWER_SYSTEM_PROMPT);
        assert_eq!(request.messages[1].role, Role::User);
        assert!(request.messages[1].content.contains("Paris is the capital."));
        assert_eq!(request.temperature, Some(settings.temperature));
        assert_eq!(request.max_tokens, Some(settings.max_tokens));
    }

    #[tokio::test]
    async fn test_generate_answer_refuses_empty_context() {
        let client = RecordingClient::default();

        let result = generate_answer(&client, &LlmSettings::default(), "Capital?", " \n").await;

        assert!(matches!(result, Err(AppError::Llm(_))));
        assert!(client.last.lock().unwrap().is_none());
    }
}
