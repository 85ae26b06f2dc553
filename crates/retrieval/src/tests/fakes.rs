//! Deterministic embedders for pipeline tests.

use crate::embeddings::EmbeddingProvider;
use crate::types::Embedding;
use ragscope_core::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One dimension per vocabulary term, valued by its occurrence count in the
/// lowercased text.
#[derive(Debug)]
pub struct VocabularyEmbedder {
    vocabulary: Vec<&'static str>,
    pub calls: AtomicUsize,
}

impl VocabularyEmbedder {
    pub fn new(vocabulary: &[&'static str]) -> Self {
        Self {
            vocabulary: vocabulary.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn vector(&self, text: &str) -> Embedding {
        let lower = text.to_lowercase();
        self.vocabulary
            .iter()
            .map(|term| lower.matches(term).count() as f32)
            .collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for VocabularyEmbedder {
    fn provider_name(&self) -> &str {
        "vocabulary"
    }

    fn model_name(&self) -> &str {
        "lookup"
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

/// Always unavailable.
#[derive(Debug, Default)]
pub struct FailingEmbedder {
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        4
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::embedding_unavailable("failing", "connection refused"))
    }
}

/// Declares 4 dimensions but returns 5 for any text containing "ragged".
#[derive(Debug)]
pub struct RaggedEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for RaggedEmbedder {
    fn provider_name(&self) -> &str {
        "ragged"
    }

    fn model_name(&self) -> &str {
        "ragged"
    }

    fn dimensions(&self) -> usize {
        4
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        Ok(texts
            .iter()
            .map(|t| {
                let len = if t.contains("ragged") { 5 } else { 4 };
                vec![1.0; len]
            })
            .collect())
    }
}

/// Drops the last vector of every batch.
#[derive(Debug)]
pub struct ShortBatchEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for ShortBatchEmbedder {
    fn provider_name(&self) -> &str {
        "short"
    }

    fn model_name(&self) -> &str {
        "short"
    }

    fn dimensions(&self) -> usize {
        2
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        let mut out: Vec<Embedding> = texts.iter().map(|_| vec![1.0, 0.0]).collect();
        out.pop();
        Ok(out)
    }
}

/// Embeds a text as `[first digit, 1.0]`, answering later digits sooner.
#[derive(Debug)]
pub struct SlowEarlyEmbedder;

impl SlowEarlyEmbedder {
    pub fn digit(text: &str) -> f32 {
        text.chars()
            .find_map(|c| c.to_digit(10))
            .unwrap_or(0) as f32
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for SlowEarlyEmbedder {
    fn provider_name(&self) -> &str {
        "slow-early"
    }

    fn model_name(&self) -> &str {
        "digits"
    }

    fn dimensions(&self) -> usize {
        2
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        let first = texts.first().map(|t| Self::digit(t)).unwrap_or(0.0);
        let delay = (9.0 - first).max(0.0) as u64 * 5;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(texts.iter().map(|t| vec![Self::digit(t), 1.0]).collect())
    }
}

/// Returns a NaN component for any text containing "corrupt".
#[derive(Debug)]
pub struct CorruptEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for CorruptEmbedder {
    fn provider_name(&self) -> &str {
        "corrupt"
    }

    fn model_name(&self) -> &str {
        "corrupt"
    }

    fn dimensions(&self) -> usize {
        2
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        Ok(texts
            .iter()
            .map(|t| {
                if t.contains("corrupt") {
                    vec![f32::NAN, 1.0]
                } else {
                    vec![1.0, 0.0]
                }
            })
            .collect())
    }
}
