//! ragscope CLI
//!
//! Runs the retrieval pipeline over local documents and prints every stage:
//! chunks, embeddings, similarity scores and the assembled context.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{AskCommand, InspectCommand};
use ragscope_core::config::{AppConfig, CliOverrides};
use ragscope_core::logging::{self, LogFormat};
use std::path::PathBuf;

/// ragscope - inspect retrieval-augmented generation step by step
#[derive(Parser, Debug)]
#[command(name = "ragscope")]
#[command(about = "Inspect retrieval-augmented generation step by step", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "RAGSCOPE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "RAGSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Embedding provider (trigram, ollama)
    #[arg(long, global = true)]
    embedding_provider: Option<String>,

    /// Embedding model identifier
    #[arg(long, global = true)]
    embedding_model: Option<String>,

    /// Embedding dimensions expected from the model
    #[arg(long, global = true)]
    embedding_dimensions: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run retrieval and print every pipeline stage
    Inspect(InspectCommand),

    /// Run retrieval and answer the question from the top-K context
    Ask(AskCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let (llm_provider, llm_model) = match &cli.command {
        Commands::Ask(cmd) => (cmd.llm_provider.clone(), cmd.llm_model.clone()),
        Commands::Inspect(_) => (None, None),
    };

    let config = AppConfig::load_with(CliOverrides {
        workspace: cli.workspace,
        config_file: cli.config,
        log_level: cli.log_level,
        verbose: cli.verbose,
        no_color: cli.no_color,
        embedding_provider: cli.embedding_provider,
        embedding_model: cli.embedding_model,
        embedding_dimensions: cli.embedding_dimensions,
        llm_provider,
        llm_model,
    })
    .context("Failed to load configuration")?;

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, format)?;

    config.validate().context("Invalid configuration")?;

    tracing::info!("ragscope starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!(
        "Embedding: {}/{} ({} dims)",
        config.embedding.provider,
        config.embedding.model,
        config.embedding.dimensions
    );

    let command_name = match &cli.command {
        Commands::Inspect(_) => "inspect",
        Commands::Ask(_) => "ask",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Inspect(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_inspect() {
        let cli = Cli::try_parse_from([
            "ragscope",
            "--embedding-provider",
            "ollama",
            "inspect",
            "capital of France",
            "--docs",
            "notes.txt",
            "-k",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.embedding_provider.as_deref(), Some("ollama"));
        match cli.command {
            Commands::Inspect(cmd) => {
                assert_eq!(cmd.retrieval.query, "capital of France");
                assert_eq!(cmd.retrieval.k, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_k_out_of_range_rejected() {
        for k in ["0", "11"] {
            let result = Cli::try_parse_from([
                "ragscope", "inspect", "q", "--docs", "a.txt", "-k", k,
            ]);
            assert!(result.is_err(), "k = {} should be rejected", k);
        }
    }

    #[test]
    fn test_docs_required() {
        assert!(Cli::try_parse_from(["ragscope", "inspect", "q"]).is_err());
    }
}
