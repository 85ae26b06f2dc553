//! Ask command handler.
//!
//! Runs retrieval, then answers the question from the top-K context.

use super::RetrievalArgs;
use clap::Args;
use ragscope_core::{config::AppConfig, AppResult};
use ragscope_llm::{create_client, generate_answer};

/// Run retrieval and answer the question from the top-K context
#[derive(Args, Debug)]
pub struct AskCommand {
    #[command(flatten)]
    pub retrieval: RetrievalArgs,

    /// LLM provider (groq, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM model identifier
    #[arg(long)]
    pub llm_model: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        // Fail on a missing key before spending time on embeddings
        let api_key = config.resolve_api_key();
        let client = create_client(&config.llm, api_key.as_deref())?;

        let run = self.retrieval.run(config).await?;
        let answer = generate_answer(client.as_ref(), &config.llm, &run.query, &run.context).await?;

        if self.json {
            let sources: Vec<serde_json::Value> = run
                .selected()
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "document": r.document,
                        "chunkIndex": r.chunk_index,
                        "score": r.score,
                        "text": r.text,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "query": run.query,
                "answer": answer,
                "provider": client.provider_name(),
                "model": config.llm.model,
                "k": run.k,
                "sources": sources,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
            println!();
            println!("Sources:");
            for record in run.selected() {
                println!(
                    "  {}#{} (score: {:.4})",
                    record.document, record.chunk_index, record.score
                );
            }
        }

        Ok(())
    }
}
