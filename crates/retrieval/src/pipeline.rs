//! Retrieval pipeline orchestration.
//!
//! [`Pipeline::run`] validates its parameters, segments every document,
//! embeds chunks and query, ranks all chunks and assembles the top-K context.
//! The returned [`PipelineRun`] keeps every intermediate artifact.

use crate::context::{assemble, validate_k};
use crate::embeddings::{EmbeddingProvider, EmbeddingSettings};
use crate::rank::{rank, Ranking};
use crate::segment::{segment, ChunkingParams};
use crate::types::{Chunk, Document, Embedding, SimilarityRecord};
use futures::stream::{self, StreamExt, TryStreamExt};
use ragscope_core::{AppError, AppResult};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// How chunk texts are sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Texts per `embed_batch` call
    pub batch_size: usize,

    /// Batches in flight at once
    pub concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            concurrency: 4,
        }
    }
}

impl From<&EmbeddingSettings> for PipelineOptions {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            batch_size: settings.batch_size,
            concurrency: settings.concurrency,
        }
    }
}

/// Every artifact of one retrieval run.
///
/// `chunk_embeddings[i]` is the embedding of `chunks[i]`. `ranking` holds one
/// record per chunk, most similar first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRun {
    pub query: String,
    pub provider: String,
    pub model: String,
    pub documents: Vec<Document>,
    pub params: ChunkingParams,
    pub k: usize,
    pub chunks: Vec<Chunk>,
    pub chunk_embeddings: Vec<Embedding>,
    pub query_embedding: Embedding,
    #[serde(rename = "similarity_ranking")]
    pub ranking: Ranking,
    pub context: String,
}

impl PipelineRun {
    /// Context for a different K, from the stored ranking.
    pub fn context_for(&self, k: usize) -> AppResult<String> {
        assemble(&self.ranking, k)
    }

    /// The first `k` ranked records.
    pub fn top_k(&self, k: usize) -> &[SimilarityRecord] {
        self.ranking.top(k)
    }

    /// The ranked records selected for `context`.
    pub fn selected(&self) -> &[SimilarityRecord] {
        self.top_k(self.k)
    }
}

/// Stateless retrieval pipeline over one embedding provider.
#[derive(Debug, Clone)]
pub struct Pipeline {
    provider: Arc<dyn EmbeddingProvider>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, options: PipelineOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Run retrieval for `query` over `documents`.
    ///
    /// Parameters are checked before any segmentation or embedding. Any
    /// failure aborts the whole run.
    #[instrument(skip_all, fields(documents = documents.len(), chunk_size = chunk_size, chunk_overlap = chunk_overlap, k = k))]
    pub async fn run(
        &self,
        query: &str,
        documents: &[Document],
        chunk_size: usize,
        chunk_overlap: usize,
        k: usize,
    ) -> AppResult<PipelineRun> {
        let params = ChunkingParams::new(chunk_size, chunk_overlap)?;
        validate_k(k)?;
        if self.options.batch_size == 0 || self.options.concurrency == 0 {
            return Err(AppError::Config(
                "Pipeline batch size and concurrency must be greater than 0".to_string(),
            ));
        }

        let started = Instant::now();

        let mut chunks = Vec::new();
        for (document_index, document) in documents.iter().enumerate() {
            chunks.extend(segment(document, document_index, params)?);
        }
        tracing::info!(
            "Segmented {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        let embed_started = Instant::now();
        let (chunk_embeddings, query_embedding) =
            futures::try_join!(self.embed_chunks(&chunks), self.provider.embed(query))?;

        if query_embedding.len() != self.provider.dimensions() {
            return Err(AppError::DimensionMismatch {
                expected: self.provider.dimensions(),
                found: query_embedding.len(),
                context: "query".to_string(),
            });
        }
        tracing::info!(
            "Embedded {} chunks and query with {}/{} in {:?}",
            chunk_embeddings.len(),
            self.provider.provider_name(),
            self.provider.model_name(),
            embed_started.elapsed()
        );

        let ranking = rank(&query_embedding, &chunks, &chunk_embeddings)?;
        let context = assemble(&ranking, k)?;

        if let Some(best) = ranking.records().first() {
            tracing::debug!(
                "Best match {}#{} (score: {:.4})",
                best.document,
                best.chunk_index,
                best.score
            );
        }
        tracing::info!(
            "Assembled context from {} of {} chunks in {:?}",
            ranking.top(k).len(),
            ranking.len(),
            started.elapsed()
        );

        Ok(PipelineRun {
            query: query.to_string(),
            provider: self.provider.provider_name().to_string(),
            model: self.provider.model_name().to_string(),
            documents: documents.to_vec(),
            params,
            k,
            chunks,
            chunk_embeddings,
            query_embedding,
            ranking,
            context,
        })
    }

    /// Embed chunk texts in batches, keeping chunk order.
    async fn embed_chunks(&self, chunks: &[Chunk]) -> AppResult<Vec<Embedding>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let provider = &self.provider;

        let batches: Vec<Vec<Embedding>> = stream::iter(texts.chunks(self.options.batch_size))
            .map(|batch| async move {
                tracing::debug!("Embedding batch of {} chunks", batch.len());
                let embeddings = provider.embed_batch(batch).await?;
                if embeddings.len() != batch.len() {
                    return Err(AppError::EmbeddingCountMismatch {
                        expected: batch.len(),
                        found: embeddings.len(),
                    });
                }
                Ok::<_, AppError>(embeddings)
            })
            .buffered(self.options.concurrency)
            .try_collect()
            .await?;

        Ok(batches.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;

    fn pipeline() -> Pipeline {
        Pipeline::new(Arc::new(TrigramProvider::new(64)), PipelineOptions::default())
    }

    #[test]
    fn test_options_from_settings() {
        let settings = EmbeddingSettings {
            batch_size: 8,
            concurrency: 2,
            ..Default::default()
        };
        assert_eq!(
            PipelineOptions::from(&settings),
            PipelineOptions {
                batch_size: 8,
                concurrency: 2
            }
        );
    }

    #[tokio::test]
    async fn test_run_records_provider_and_params() {
        let docs = vec![Document::new("a.txt", "Rust ownership and borrowing rules.")];
        let run = pipeline().run("ownership", &docs, 12, 3, 2).await.unwrap();

        assert_eq!(run.provider, "trigram");
        assert_eq!(run.model, "trigram-v1");
        assert_eq!(run.params, ChunkingParams::new(12, 3).unwrap());
        assert_eq!(run.k, 2);
        assert_eq!(run.query_embedding.len(), 64);
        assert_eq!(run.selected().len(), 2);
    }

    #[tokio::test]
    async fn test_bundle_json_field_names() {
        let docs = vec![Document::new("a.txt", "Rust ownership and borrowing rules.")];
        let run = pipeline().run("ownership", &docs, 12, 3, 2).await.unwrap();

        let json = serde_json::to_value(&run).unwrap();
        for field in [
            "documents",
            "chunks",
            "chunk_embeddings",
            "query_embedding",
            "similarity_ranking",
            "context",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
        assert!(json.get("ranking").is_none());
        assert_eq!(
            json["similarity_ranking"].as_array().unwrap().len(),
            run.chunks.len()
        );
    }

    #[tokio::test]
    async fn test_run_rejects_zero_options() {
        let pipeline = Pipeline::new(
            Arc::new(TrigramProvider::new(8)),
            PipelineOptions {
                batch_size: 0,
                concurrency: 1,
            },
        );
        let docs = vec![Document::new("a.txt", "text")];
        assert!(matches!(
            pipeline.run("q", &docs, 4, 0, 1).await,
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_run_without_documents() {
        let run = pipeline().run("anything", &[], 10, 2, 3).await.unwrap();
        assert!(run.chunks.is_empty());
        assert!(run.ranking.is_empty());
        assert_eq!(run.context, "");
        assert_eq!(run.query_embedding.len(), 64);
    }

    #[tokio::test]
    async fn test_top_k_and_context_for() {
        let docs = vec![Document::new("a.txt", "abcdefghijklmnopqrstuvwxyz")];
        let run = pipeline().run("alphabet", &docs, 5, 1, 1).await.unwrap();

        assert_eq!(run.top_k(3).len(), 3);
        assert_eq!(run.top_k(0).len(), 0);
        assert_eq!(run.context_for(1).unwrap(), run.context);
        assert!(run.context_for(0).is_err());
    }
}
