//! Embedding providers.
//!
//! The pipeline consumes embeddings through [`EmbeddingProvider`]. Concrete
//! providers are built from [`EmbeddingSettings`] by [`create_provider`].

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use ragscope_core::config::EmbeddingSettings;
