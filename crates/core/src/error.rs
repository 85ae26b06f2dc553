//! Error types for ragscope.
//!
//! One enum covers the retrieval failure kinds (bad chunking parameters,
//! unreachable embedding provider, embedding shape violations) and the
//! ambient categories used by the CLI and the answer-generation client.

use thiserror::Error;

/// Unified error type for ragscope.
///
/// All fallible functions return `Result<T, AppError>`. Each retrieval
/// variant carries the offending parameter or value so the caller can render
/// a precise message.
#[derive(Error, Debug)]
pub enum AppError {
    /// Chunking or selection parameters rejected before any work starts
    /// (`chunk_size == 0`, `overlap >= chunk_size`, `k == 0`).
    #[error("Invalid chunking parameters: {parameter} = {value} ({reason})")]
    InvalidChunkingParameters {
        parameter: &'static str,
        value: usize,
        reason: String,
    },

    /// The embedding provider could not be reached or returned an error.
    #[error("Embedding unavailable from provider '{provider}': {reason}")]
    EmbeddingUnavailable { provider: String, reason: String },

    /// Embeddings of differing length met in one run.
    #[error("Embedding dimension mismatch ({context}): expected {expected}, found {found}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        context: String,
    },

    /// An embedding holds a NaN or infinite component.
    #[error("Invalid embedding ({context}): non-finite value {value} at index {index}")]
    InvalidEmbedding {
        context: String,
        index: usize,
        value: f32,
    },

    /// The provider returned a different number of vectors than texts sent.
    #[error("Embedding count mismatch: expected {expected} embeddings, found {found}")]
    EmbeddingCountMismatch { expected: usize, found: usize },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document loading errors (unreadable, non-UTF-8, duplicate names)
    #[error("Document error: {0}")]
    Document(String),

    /// Answer-generation provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Shorthand for an [`AppError::InvalidChunkingParameters`].
    pub fn invalid_parameter(
        parameter: &'static str,
        value: usize,
        reason: impl Into<String>,
    ) -> Self {
        AppError::InvalidChunkingParameters {
            parameter,
            value,
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`AppError::EmbeddingUnavailable`].
    pub fn embedding_unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::EmbeddingUnavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message_names_parameter() {
        let err = AppError::invalid_parameter("overlap", 20, "must be smaller than chunk_size (20)");
        let message = err.to_string();
        assert!(message.contains("overlap = 20"));
        assert!(message.contains("chunk_size (20)"));
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = AppError::DimensionMismatch {
            expected: 768,
            found: 384,
            context: "chunk 'a.txt'#2".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("expected 768"));
        assert!(message.contains("found 384"));
        assert!(message.contains("a.txt"));
    }

    #[test]
    fn test_invalid_embedding_message() {
        let err = AppError::InvalidEmbedding {
            context: "chunk 'a.txt'#1".to_string(),
            index: 3,
            value: f32::NAN,
        };
        let message = err.to_string();
        assert!(message.contains("a.txt"));
        assert!(message.contains("NaN at index 3"));
    }

    #[test]
    fn test_embedding_unavailable_message() {
        let err = AppError::embedding_unavailable("ollama", "connection refused");
        assert_eq!(
            err.to_string(),
            "Embedding unavailable from provider 'ollama': connection refused"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
