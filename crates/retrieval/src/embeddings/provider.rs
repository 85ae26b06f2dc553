//! Embedding provider trait and factory.

use super::providers::{OllamaProvider, TrigramProvider};
use crate::types::Embedding;
use ragscope_core::config::EmbeddingSettings;
use ragscope_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// Implementations must be deterministic for a given input and model, and
/// return vectors of exactly [`dimensions`](Self::dimensions) values. A provider
/// that cannot produce an embedding returns
/// [`AppError::EmbeddingUnavailable`]; it never substitutes a zero vector.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts, one per text, in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>>;

    /// Generate embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Embedding> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        if results.len() != 1 {
            return Err(AppError::EmbeddingCountMismatch {
                expected: 1,
                found: results.len(),
            });
        }
        Ok(results.remove(0))
    }
}

/// Create an embedding provider from settings.
pub fn create_provider(settings: &EmbeddingSettings) -> AppResult<Arc<dyn EmbeddingProvider>> {
    settings.validate()?;

    tracing::debug!(
        "Creating embedding provider: provider={}, model={}, dimensions={}",
        settings.provider,
        settings.model,
        settings.dimensions
    );

    match settings.provider.as_str() {
        "trigram" => Ok(Arc::new(TrigramProvider::new(settings.dimensions))),
        "ollama" => Ok(Arc::new(OllamaProvider::new(settings)?)),
        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            settings.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trigram_provider() {
        let provider = create_provider(&EmbeddingSettings::default()).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_ollama_provider_without_network() {
        let settings = EmbeddingSettings {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            ..Default::default()
        };

        let provider = create_provider(&settings).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), "nomic-embed-text");
        assert_eq!(provider.dimensions(), 768);
    }

    #[test]
    fn test_create_unknown_provider() {
        let settings = EmbeddingSettings {
            provider: "unknown".to_string(),
            ..Default::default()
        };

        let result = create_provider(&settings);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[test]
    fn test_create_rejects_zero_dimensions() {
        let settings = EmbeddingSettings {
            dimensions: 0,
            ..Default::default()
        };
        assert!(matches!(
            create_provider(&settings),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&EmbeddingSettings::default()).unwrap();
        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
