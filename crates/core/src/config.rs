//! Configuration management for ragscope.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.ragscope/config.yaml` in the workspace, or `RAGSCOPE_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Only the binary reads the environment. Library crates receive the resolved
//! settings structs at construction time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers known to the retrieval crate.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Model name of the built-in trigram embedder.
pub const TRIGRAM_MODEL: &str = "trigram-v1";

/// Answer-generation providers known to the llm crate.
pub const KNOWN_LLM_PROVIDERS: [&str; 2] = ["groq", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains `.ragscope/`)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log filter override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Chunking and top-K defaults
    pub retrieval: RetrievalSettings,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Answer-generation provider settings
    pub llm: LlmSettings,
}

/// Default chunking and selection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievalSettings {
    /// Maximum characters per chunk
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,

    /// Number of ranked chunks joined into the context
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 5,
        }
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Base URL for HTTP providers
    pub endpoint: String,

    /// Texts per embedding request
    pub batch_size: usize,

    /// Embedding requests in flight at once
    pub concurrency: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: TRIGRAM_MODEL.to_string(),
            dimensions: 384,
            endpoint: "http://localhost:11434".to_string(),
            batch_size: 32,
            concurrency: 4,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingSettings {
    /// Check the settings before a provider is built from them.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }
        if self.provider == "ollama" && self.model == TRIGRAM_MODEL {
            return Err(AppError::Config(format!(
                "Embedding model '{}' is the built-in trigram model; set embedding.model \
                 (or --embedding-model) to an Ollama embedding model such as nomic-embed-text",
                TRIGRAM_MODEL
            )));
        }
        if self.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch size must be greater than 0".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(AppError::Config(
                "Embedding concurrency must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Answer-generation provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    /// Provider name: "groq" or "ollama"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom base URL (provider default when absent)
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens in the answer
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            endpoint: None,
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            timeout_secs: 60,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    retrieval: Option<RetrievalSettings>,
    embedding: Option<EmbeddingSettings>,
    llm: Option<LlmSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            retrieval: RetrievalSettings::default(),
            embedding: EmbeddingSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, config file and environment.
    ///
    /// Environment variables:
    /// - `RAGSCOPE_WORKSPACE`: Override workspace path
    /// - `RAGSCOPE_CONFIG`: Path to config file
    /// - `RAGSCOPE_EMBEDDING_PROVIDER` / `RAGSCOPE_EMBEDDING_MODEL`
    /// - `RAGSCOPE_LLM_PROVIDER` / `RAGSCOPE_LLM_MODEL`
    /// - `RUST_LOG`: Log filter
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use ragscope_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Chunk size: {}", config.retrieval.chunk_size);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(CliOverrides::default())
    }

    /// Like [`load`](Self::load), then apply `overrides` on top.
    ///
    /// A workspace or config file given in `overrides` is used to locate the
    /// config file, ahead of the environment.
    pub fn load_with(overrides: CliOverrides) -> AppResult<Self> {
        let workspace = overrides
            .workspace
            .clone()
            .or_else(|| std::env::var("RAGSCOPE_WORKSPACE").ok().map(PathBuf::from));
        let config_file = overrides
            .config_file
            .clone()
            .or_else(|| std::env::var("RAGSCOPE_CONFIG").ok().map(PathBuf::from));

        let mut config = Self::load_from(workspace, config_file)?;

        if let Ok(provider) = std::env::var("RAGSCOPE_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Ok(model) = std::env::var("RAGSCOPE_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(provider) = std::env::var("RAGSCOPE_LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(model) = std::env::var("RAGSCOPE_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }
        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config.with_overrides(overrides))
    }

    /// Load defaults plus the config file, without consulting the environment.
    ///
    /// The file is `config_file` when given, otherwise
    /// `<workspace>/.ragscope/config.yaml` if it exists. An explicitly named
    /// file that does not exist is an error.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config.config_file = Some(path.clone());
                Some(path)
            }
            None => {
                let default_path = config.ragscope_dir().join("config.yaml");
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the environment and the config file.
    pub fn with_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(workspace) = overrides.workspace {
            self.workspace = workspace;
        }
        if let Some(config_file) = overrides.config_file {
            self.config_file = Some(config_file);
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        }
        if let Some(provider) = overrides.embedding_provider {
            self.embedding.provider = provider;
        }
        if let Some(model) = overrides.embedding_model {
            self.embedding.model = model;
        }
        if let Some(dimensions) = overrides.embedding_dimensions {
            self.embedding.dimensions = dimensions;
        }
        if let Some(provider) = overrides.llm_provider {
            self.llm.provider = provider;
        }
        if let Some(model) = overrides.llm_model {
            self.llm.model = model;
        }

        if overrides.verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if overrides.no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .ragscope directory.
    pub fn ragscope_dir(&self) -> PathBuf {
        self.workspace.join(".ragscope")
    }

    /// Resolve the answer-generation API key from its environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate the resolved configuration.
    pub fn validate(&self) -> AppResult<()> {
        let retrieval = &self.retrieval;
        if retrieval.chunk_size == 0 {
            return Err(AppError::Config(
                "retrieval.chunkSize must be greater than 0".to_string(),
            ));
        }
        if retrieval.chunk_overlap >= retrieval.chunk_size {
            return Err(AppError::Config(format!(
                "retrieval.chunkOverlap ({}) must be smaller than retrieval.chunkSize ({})",
                retrieval.chunk_overlap, retrieval.chunk_size
            )));
        }
        if retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be at least 1".to_string(),
            ));
        }

        self.embedding.validate()?;

        if !KNOWN_LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }
}

/// Command-line values that override loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub workspace: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub verbose: bool,
    pub no_color: bool,
    pub embedding_provider: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_dimensions: Option<usize>,
    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
}
