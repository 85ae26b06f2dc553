//! Answer generation for ragscope.
//!
//! Turns an assembled retrieval context into a grounded answer through a
//! provider-agnostic [`LlmClient`].
//!
//! # Providers
//! - **Groq**: hosted, OpenAI-compatible chat completions (default)
//! - **Ollama**: local runtime, `/api/chat`
//!
//! # Example
//! ```no_run
//! use ragscope_core::config::LlmSettings;
//! use ragscope_llm::{create_client, generate_answer};
//!
//! # async fn example() -> ragscope_core::AppResult<()> {
//! let settings = LlmSettings {
//!     provider: "ollama".to_string(),
//!     model: "llama3.2".to_string(),
//!     ..Default::default()
//! };
//! let client = create_client(&settings, None)?;
//! let answer = generate_answer(client.as_ref(), &settings, "What is the capital of France?", "Paris is the capital of France.").await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod answer;
pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use answer::{build_answer_prompt, generate_answer, ANSWER_SYSTEM_PROMPT};
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage, Message, Role};
pub use factory::create_client;
pub use providers::{GroqClient, OllamaClient};
