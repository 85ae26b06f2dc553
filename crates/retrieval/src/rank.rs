//! Cosine similarity ranking of chunks against a query.

use crate::types::{Chunk, Embedding, SimilarityRecord};
use ragscope_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Cosine similarity of two vectors of equal length.
///
/// Returns `0.0` when either vector has zero magnitude. Accumulates in `f64`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> AppResult<f32> {
    if a.len() != b.len() {
        return Err(AppError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
            context: "cosine similarity".to_string(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

/// Reject a vector holding NaN or an infinite component.
pub fn ensure_finite(vector: &[f32], context: impl Into<String>) -> AppResult<()> {
    match vector.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(AppError::InvalidEmbedding {
            context: context.into(),
            index,
            value: vector[index],
        }),
        None => Ok(()),
    }
}

/// Every chunk of a run, most similar first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ranking {
    records: Vec<SimilarityRecord>,
}

impl Ranking {
    pub fn records(&self) -> &[SimilarityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `k` records, or all of them when `k` exceeds the length.
    pub fn top(&self, k: usize) -> &[SimilarityRecord] {
        &self.records[..k.min(self.records.len())]
    }

    pub fn into_records(self) -> Vec<SimilarityRecord> {
        self.records
    }
}

/// Score every chunk against the query and sort by descending similarity.
///
/// `embeddings[i]` belongs to `chunks[i]`. Equal scores keep the original
/// chunk order, which is document order then chunk index.
pub fn rank(query: &[f32], chunks: &[Chunk], embeddings: &[Embedding]) -> AppResult<Ranking> {
    if chunks.len() != embeddings.len() {
        return Err(AppError::EmbeddingCountMismatch {
            expected: chunks.len(),
            found: embeddings.len(),
        });
    }

    ensure_finite(query, "query")?;

    let mut records = chunks
        .iter()
        .zip(embeddings)
        .enumerate()
        .map(|(position, (chunk, embedding))| {
            if embedding.len() != query.len() {
                return Err(AppError::DimensionMismatch {
                    expected: query.len(),
                    found: embedding.len(),
                    context: format!("chunk {}", chunk.label()),
                });
            }
            ensure_finite(embedding, format!("chunk {}", chunk.label()))?;
            Ok(SimilarityRecord {
                position,
                document: chunk.document.clone(),
                document_index: chunk.document_index,
                chunk_index: chunk.chunk_index,
                text: chunk.text.clone(),
                score: cosine_similarity(query, embedding)?,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    records.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.position.cmp(&b.position))
    });

    Ok(Ranking { records })
}
