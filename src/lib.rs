//! Ollama client — async adapter for locally hosted LLM inference.
//!
//! This crate handles all communication with a local Ollama endpoint:
//! - Single-shot and streaming generation
//! - Multi-turn chat with optional tool definitions
//! - Model availability checks against the local registry
//! - Model pull (download)
//!
//! The client speaks Ollama's native HTTP API, making the model a config
//! choice rather than a code change. Generation and chat errors propagate to
//! the caller; the availability and pull checks collapse failures to a
//! boolean, so callers get a plain yes/no even when the server is down.
//!
//! Logging goes through `tracing`; the crate never installs a subscriber —
//! that is the host application's concern.
//!
//! ```no_run
//! use ollama_client::{OllamaClient, OllamaConfig};
//!
//! # async fn run() -> Result<(), ollama_client::OllamaError> {
//! let client = OllamaClient::new(OllamaConfig::for_model("mistral:7b"))?;
//! if !client.check_model_availability().await {
//!     client.pull_model().await;
//! }
//! let answer = client.generate("Hello", Some("Be terse")).await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod streaming;
pub mod types;

// Re-exports for convenience
pub use client::OllamaClient;
pub use config::OllamaConfig;
pub use errors::OllamaError;
pub use types::{
    ChatMessage, ChatResponse, FunctionCall, FunctionDefinition, ModelEntry, Role, ToolCall,
    ToolDefinition,
};
