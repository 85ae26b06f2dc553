//! Retrieval pipeline for ragscope.
//!
//! Segments documents into overlapping character chunks, embeds chunks and
//! query through an [`EmbeddingProvider`], ranks every chunk by cosine
//! similarity, and joins the top K into a context string. [`Pipeline::run`]
//! returns every intermediate artifact so a caller can render each stage.

pub mod context;
pub mod documents;
pub mod embeddings;
pub mod pipeline;
pub mod rank;
pub mod segment;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use context::{assemble, CONTEXT_DELIMITER};
pub use documents::load_documents;
pub use embeddings::{create_provider, EmbeddingProvider};
pub use pipeline::{Pipeline, PipelineOptions, PipelineRun};
pub use rank::{cosine_similarity, rank, Ranking};
pub use segment::{segment, segment_text, ChunkingParams, TextSpan};
pub use types::{Chunk, Document, Embedding, SimilarityRecord};
