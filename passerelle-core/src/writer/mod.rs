//! Newsroom writers: transitions between paragraphs and title/blurb pairs.
//!
//! Both writers are single-call wrappers around a [`Provider`](crate::provider::Provider):
//! build the messages, request one completion, return the first choice
//! trimmed. No retries and no validation of the reply.

mod examples;
mod headline;
pub mod prompts;
mod transition;

pub use examples::{load_examples, sample_examples, Example};
pub use headline::{Headline, HeadlineGenerator};
pub use transition::{build_transition_messages, TransitionGenerator};

use crate::provider::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to read examples from {path}: {source}")]
    ExamplesRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse examples: {0}")]
    ExamplesParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WriterError>;
