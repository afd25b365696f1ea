//! Few-shot transition writer.
//!
//! Each call samples a handful of editor-written examples, lays them out as
//! alternating user/assistant turns after the system instruction, then asks
//! for the transition between the two real paragraphs:
//!
//! ```text
//! system     TRANSITION_SYSTEM_PROMPT
//! user       example.input        ┐ repeated for each
//! assistant  example.transition   ┘ sampled example
//! user       "{para_a}\nTRANSITION\n{para_b}"
//! ```
//!
//! The reply is returned trimmed and otherwise untouched: word count and
//! banned phrases are left to the model.

use super::examples::{sample_examples, Example};
use super::prompts::{CONTEXT_LABEL, TRANSITION_MARKER, TRANSITION_SYSTEM_PROMPT};
use super::Result;
use crate::config::TransitionConfig;
use crate::provider::{ChatRequest, Message, Provider};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds the full message sequence for one transition request.
///
/// A non-empty `context` is prepended to the first paragraph under
/// [`CONTEXT_LABEL`].
pub fn build_transition_messages(
    para_a: &str,
    para_b: &str,
    examples: &[&Example],
    context: Option<&str>,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2 + examples.len() * 2);
    messages.push(Message::system(TRANSITION_SYSTEM_PROMPT));

    for example in examples {
        messages.push(Message::user(example.input.clone()));
        messages.push(Message::assistant(example.transition.clone()));
    }

    let first = match context.filter(|c| !c.is_empty()) {
        Some(context) => format!("{}\n{}\n\n{}", CONTEXT_LABEL, context.trim(), para_a.trim()),
        None => para_a.trim().to_string(),
    };
    messages.push(Message::user(format!(
        "{}\n{}\n{}",
        first,
        TRANSITION_MARKER,
        para_b.trim()
    )));

    messages
}

/// Generates short connective phrases between two paragraphs.
#[derive(Clone)]
pub struct TransitionGenerator {
    provider: Arc<dyn Provider>,
    config: TransitionConfig,
}

impl TransitionGenerator {
    /// Uses `gpt-4`, temperature 0.5, 20 output tokens and 3 examples.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self::from_config(provider, TransitionConfig::default())
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: TransitionConfig) -> Self {
        Self { provider, config }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Samples examples with `rng` and builds the message sequence.
    pub fn prepare_messages<R: Rng + ?Sized>(
        &self,
        para_a: &str,
        para_b: &str,
        examples: &[Example],
        context: Option<&str>,
        rng: &mut R,
    ) -> Vec<Message> {
        let selected = sample_examples(examples, self.config.few_shot, rng);
        debug!(pool = examples.len(), selected = selected.len(), "Sampled few-shot examples");
        build_transition_messages(para_a, para_b, &selected, context)
    }

    /// Generates a transition, sampling examples from the thread-local RNG.
    ///
    /// Two calls with identical inputs may show the model different examples.
    pub async fn generate(
        &self,
        para_a: &str,
        para_b: &str,
        examples: &[Example],
        context: Option<&str>,
    ) -> Result<String> {
        let messages = {
            let mut rng = rand::thread_rng();
            self.prepare_messages(para_a, para_b, examples, context, &mut rng)
        };
        self.complete(messages).await
    }

    /// Generates a transition, sampling examples from `rng`.
    pub async fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        para_a: &str,
        para_b: &str,
        examples: &[Example],
        context: Option<&str>,
        rng: &mut R,
    ) -> Result<String> {
        let messages = self.prepare_messages(para_a, para_b, examples, context, rng);
        self.complete(messages).await
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String> {
        let request = ChatRequest::new(self.config.model.clone(), messages)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let response = self.provider.complete(request).await?;
        let transition = response.first_text()?;
        info!(model = %response.model, transition = %transition, "Generated transition");
        Ok(transition)
    }
}
