//! passerelle - Transitions, titles and context retrieval for French news digests
//!
//! This is the convenience wrapper crate that re-exports the passerelle core.
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! passerelle = "0.1"
//! ```
//!
//! ```no_run
//! use passerelle::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load_or_default();
//! let provider = create_provider(&config.llm)?;
//!
//! let examples = vec![Example::new(
//!     "La mairie rénove l'école.\nTRANSITION\nLe club de foot recrute.",
//!     "Côté sport,",
//! )];
//! let transition = TransitionGenerator::new(Arc::clone(&provider))
//!     .generate("Paris inaugure un parc.", "Lyon ouvre un musée.", &examples, None)
//!     .await?;
//! println!("{transition}");
//! # Ok(())
//! # }
//! ```

// Re-export core
pub use passerelle_core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use passerelle_core::config::Config;
    pub use passerelle_core::provider::{create_provider, Provider};
    pub use passerelle_core::rag::{load_embeddings_from_documents, Embedder, KnowledgeBase};
    pub use passerelle_core::writer::{Example, Headline, HeadlineGenerator, TransitionGenerator};
}
