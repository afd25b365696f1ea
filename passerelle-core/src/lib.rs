//! passerelle-core - Writing assistance for French regional news digests
//!
//! Provides the building blocks for assembling short news roundups:
//! - LLM provider abstraction (OpenAI-compatible APIs, Ollama)
//! - Context retrieval over a folder of documents (embeddings + flat L2 index)
//! - Transition and title/blurb writers
//! - Configuration management

// Public modules
pub mod config;
pub mod provider;
pub mod rag;
pub mod writer;

#[cfg(test)]
mod testing;

// Public exports
pub use config::{Config, HeadlineConfig, LlmConfig, RagConfig, TransitionConfig};
pub use rag::{
    load_embeddings_from_documents, retrieve_context, Embedder, FlatL2Index, KnowledgeBase,
    RagError, VectorIndex,
};
pub use writer::{Example, Headline, HeadlineGenerator, TransitionGenerator, WriterError};

// Provider exports
pub use provider::{
    create_provider, ChatRequest, ChatResponse, Message, OllamaProvider, OpenAiProvider, Provider,
    ProviderError, Role,
};
