//! Retrieval data model.

use serde::{Deserialize, Serialize};

/// A fixed-length embedding vector.
pub type Embedding = Vec<f32>;

/// A named source text, owned by the caller and only read by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier (file name or relative path)
    pub name: String,

    /// Raw text content
    pub text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A contiguous span of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Name of the parent document
    pub document: String,

    /// Position of the parent in the run's document list
    pub document_index: usize,

    /// Chunk position within its document (0-indexed)
    pub chunk_index: usize,

    /// Chunk text, an exact substring of the parent
    pub text: String,

    /// Half-open character range in the parent
    pub char_range: (usize, usize),

    /// Half-open byte range in the parent
    pub byte_range: (usize, usize),
}

impl Chunk {
    /// Short display label, e.g. `notes.md#3`.
    pub fn label(&self) -> String {
        format!("{}#{}", self.document, self.chunk_index)
    }
}

/// Query-chunk similarity for one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecord {
    /// Index of the chunk in the run's chunk sequence
    pub position: usize,

    /// Name of the originating document
    pub document: String,

    /// Position of the originating document in the run's document list
    pub document_index: usize,

    /// Chunk index within the document
    pub chunk_index: usize,

    /// Chunk text
    pub text: String,

    /// Cosine similarity to the query, in [-1, 1]
    pub score: f32,
}
