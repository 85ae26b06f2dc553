//! Command handlers for the ragscope CLI.

pub mod ask;
pub mod inspect;

pub use ask::AskCommand;
pub use inspect::InspectCommand;

use clap::Args;
use ragscope_core::config::AppConfig;
use ragscope_core::{AppError, AppResult};
use ragscope_retrieval::context::validate_k;
use ragscope_retrieval::{
    create_provider, load_documents, ChunkingParams, Pipeline, PipelineOptions, PipelineRun,
};
use std::path::PathBuf;

/// Arguments shared by every command that runs retrieval.
#[derive(Args, Debug, Clone)]
pub struct RetrievalArgs {
    /// The question to retrieve context for
    pub query: String,

    /// Document files or directories
    #[arg(short, long = "docs", required = true, num_args = 1..)]
    pub docs: Vec<PathBuf>,

    /// File extensions picked up from directories (default: txt, md)
    #[arg(long = "ext")]
    pub extensions: Vec<String>,

    /// Maximum characters per chunk (default from config)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks (default from config)
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Number of top chunks joined into the context (1-10)
    #[arg(short, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub k: Option<u8>,
}

impl RetrievalArgs {
    /// Load the documents and run the pipeline with config defaults filled in.
    pub async fn run(&self, config: &AppConfig) -> AppResult<PipelineRun> {
        let chunk_size = self.chunk_size.unwrap_or(config.retrieval.chunk_size);
        let chunk_overlap = self.chunk_overlap.unwrap_or(config.retrieval.chunk_overlap);
        let k = self.k.map(usize::from).unwrap_or(config.retrieval.top_k);

        // Reject bad parameters before reading any file
        ChunkingParams::new(chunk_size, chunk_overlap)?;
        validate_k(k)?;

        let documents = load_documents(&self.docs, &self.extensions)?;
        if documents.is_empty() {
            return Err(AppError::Document(format!(
                "No documents found in {:?}",
                self.docs
            )));
        }

        tracing::debug!(
            "Retrieval over {} documents (chunk_size: {}, chunk_overlap: {}, k: {})",
            documents.len(),
            chunk_size,
            chunk_overlap,
            k
        );

        let provider = create_provider(&config.embedding)?;
        let pipeline = Pipeline::new(provider, PipelineOptions::from(&config.embedding));

        pipeline
            .run(&self.query, &documents, chunk_size, chunk_overlap, k)
            .await
    }
}
