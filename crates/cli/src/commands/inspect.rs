//! Inspect command handler.
//!
//! Prints the seven stages of a retrieval run: raw documents, chunks, chunk
//! embeddings, query embedding, similarity scores, top-K chunks and the final
//! context.

use super::RetrievalArgs;
use clap::Args;
use ragscope_core::{config::AppConfig, AppResult};
use ragscope_retrieval::{Embedding, PipelineRun};
use std::fmt::Write;

/// Run retrieval and print every pipeline stage
#[derive(Args, Debug)]
pub struct InspectCommand {
    #[command(flatten)]
    pub retrieval: RetrievalArgs,

    /// Embedding dimensions shown per vector
    #[arg(long, default_value_t = 10)]
    pub preview_dims: usize,

    /// Output the whole run as JSON
    #[arg(long)]
    pub json: bool,
}

impl InspectCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing inspect command");

        let run = self.retrieval.run(config).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&run)?);
        } else {
            print!("{}", render(&run, self.preview_dims));
        }

        Ok(())
    }
}

/// First `dims` values, rounded to 4 decimals.
pub fn preview(embedding: &Embedding, dims: usize) -> Vec<f32> {
    embedding
        .iter()
        .take(dims)
        .map(|x| (x * 10_000.0).round() / 10_000.0)
        .collect()
}

fn format_preview(embedding: &Embedding, dims: usize) -> String {
    let values: Vec<String> = preview(embedding, dims)
        .iter()
        .map(|x| format!("{:.4}", x))
        .collect();
    let ellipsis = if embedding.len() > dims { ", ..." } else { "" };
    format!("[{}{}]", values.join(", "), ellipsis)
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n=== {} ===", title);
}

/// Render a run as plain text, one section per stage.
pub fn render(run: &PipelineRun, preview_dims: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Query: {}", run.query);
    let _ = writeln!(
        out,
        "Embedding: {}/{} ({} dims)",
        run.provider,
        run.model,
        run.query_embedding.len()
    );

    heading(&mut out, &format!("1. Raw documents ({})", run.documents.len()));
    for (i, doc) in run.documents.iter().enumerate() {
        let _ = writeln!(out, "[{}] {} ({} chars)", i, doc.name, doc.char_len());
        let _ = writeln!(out, "{}", doc.text);
    }

    heading(
        &mut out,
        &format!(
            "2. Chunks ({}, size {}, overlap {})",
            run.chunks.len(),
            run.params.chunk_size,
            run.params.overlap
        ),
    );
    for chunk in &run.chunks {
        let _ = writeln!(
            out,
            "{} chars {}..{}: {:?}",
            chunk.label(),
            chunk.char_range.0,
            chunk.char_range.1,
            chunk.text
        );
    }

    heading(
        &mut out,
        &format!("3. Chunk embeddings (first {} dims)", preview_dims),
    );
    for (chunk, embedding) in run.chunks.iter().zip(&run.chunk_embeddings) {
        let _ = writeln!(
            out,
            "{} {}",
            chunk.label(),
            format_preview(embedding, preview_dims)
        );
    }

    heading(&mut out, "4. Query embedding");
    let _ = writeln!(out, "{}", format_preview(&run.query_embedding, preview_dims));

    heading(&mut out, "5. Similarity scores");
    for (rank, record) in run.ranking.records().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:.4}  {}#{}: {:?}",
            rank + 1,
            record.score,
            record.document,
            record.chunk_index,
            record.text
        );
    }

    heading(&mut out, &format!("6. Top {} chunks", run.k));
    for record in run.selected() {
        let _ = writeln!(
            out,
            "{}#{} ({:.4}): {:?}",
            record.document, record.chunk_index, record.score, record.text
        );
    }

    heading(&mut out, "7. Final context");
    let _ = writeln!(out, "{}", run.context);

    out
}
