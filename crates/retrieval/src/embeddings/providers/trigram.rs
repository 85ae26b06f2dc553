//! Offline embedding provider built from hashed character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use crate::types::Embedding;
use ragscope_core::config::TRIGRAM_MODEL;
use ragscope_core::AppResult;
use std::collections::BTreeMap;

/// Words too common to carry meaning.
const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "who", "how",
];

/// Deterministic, content-aware embeddings for local and offline use.
///
/// Text is lowercased and split into words with surrounding punctuation
/// removed. Stop words and words shorter than three characters are dropped.
/// Each remaining word adds its frequency to one bucket for the whole word and
/// `sqrt(frequency)` to one bucket per character trigram, and the result is
/// scaled to unit length.
///
/// Not semantically accurate like a neural model, but identical texts always
/// map to identical vectors and texts sharing words or word fragments score
/// higher. Text without indexable words maps to the zero vector.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    /// Create a new trigram provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(&self, seed: u64, bytes: &[u8]) -> usize {
        let hash = bytes
            .iter()
            .fold(0u64, |acc, &b| acc.wrapping_mul(seed).wrapping_add(u64::from(b)));
        (hash % self.dimensions as u64) as usize
    }

    fn generate(&self, text: &str) -> Embedding {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        // BTreeMap keeps accumulation order fixed, so float sums are reproducible
        let mut word_freq: BTreeMap<&str, u32> = BTreeMap::new();
        for word in lower
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let freq = *freq as f32;
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                embedding[self.bucket(37, trigram.as_bytes())] += freq.sqrt();
            }
            embedding[self.bucket(31, word.as_bytes())] += freq;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        TRIGRAM_MODEL
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        Ok(texts.iter().map(|text| self.generate(text)).collect())
    }
}
