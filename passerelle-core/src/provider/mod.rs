//! LLM provider abstraction layer.
//!
//! This module defines a common interface for different LLM backends
//! (OpenAI-compatible APIs, Ollama) to provide chat completions and embeddings.

mod types;
pub mod ollama;
pub mod openai;

use crate::config::{Backend, LlmConfig};
use std::sync::Arc;
use tracing::info;

// Re-export common types
pub use types::{
    ChatRequest,
    ChatResponse,
    Choice,
    Message,
    Provider,
    ProviderError,
    Result,
    Role,
};

// Re-export provider implementations
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Creates the provider selected by `config.backend`.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn Provider>> {
    info!(backend = ?config.backend, base_url = %config.base_url, "Creating provider");
    match config.backend {
        Backend::OpenAi => Ok(Arc::new(OpenAiProvider::new(config)?)),
        Backend::Ollama => Ok(Arc::new(OllamaProvider::new(config))),
    }
}
