//! Title and blurb ("chapeau") writer.

use super::prompts::HEADLINE_SYSTEM_PROMPT;
use super::Result;
use crate::config::HeadlineConfig;
use crate::provider::{ChatRequest, Message, Provider};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::info;

/// Generates a title line and a blurb line from an article's first paragraph.
#[derive(Clone)]
pub struct HeadlineGenerator {
    provider: Arc<dyn Provider>,
    config: HeadlineConfig,
}

impl HeadlineGenerator {
    /// Uses `gpt-3.5-turbo`, temperature 0.5 and 100 output tokens.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self::from_config(provider, HeadlineConfig::default())
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: HeadlineConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &HeadlineConfig {
        &self.config
    }

    /// Returns the model's reply trimmed but otherwise raw.
    ///
    /// The reply is expected to read `Titre : ...` / `Chapeau : ...`, but
    /// that is not checked. Use [`Headline::parse`] to split it.
    pub async fn generate(&self, paragraph: &str) -> Result<String> {
        let messages = vec![
            Message::system(HEADLINE_SYSTEM_PROMPT),
            Message::user(paragraph.trim()),
        ];
        let request = ChatRequest::new(self.config.model.clone(), messages)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let response = self.provider.complete(request).await?;
        let text = response.first_text()?;
        info!(model = %response.model, chars = text.len(), "Generated headline");
        Ok(text)
    }
}

/// A title and blurb split out of a generator reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub blurb: String,
}

fn field_regex(label: &str) -> Regex {
    // Tolerates markdown emphasis, list markers and French non-breaking
    // spaces around the label. Never crosses a line break after it.
    Regex::new(&format!(
        r"(?im)^[\s*_#>-]*{label}[\t\p{{Zs}}*_]*:[\t\p{{Zs}}*_]*(.*?)[\t\p{{Zs}}*_]*$"
    ))
    .expect("static headline regex")
}

impl Headline {
    /// Reads the `Titre :` and `Chapeau :` lines of a reply.
    ///
    /// Returns `None` unless both lines are present and non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        static TITLE: OnceLock<Regex> = OnceLock::new();
        static BLURB: OnceLock<Regex> = OnceLock::new();

        let title = TITLE.get_or_init(|| field_regex("titre"));
        let blurb = BLURB.get_or_init(|| field_regex("chapeau"));

        let capture = |re: &Regex| {
            re.captures(raw)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Some(Self {
            title: capture(title)?,
            blurb: capture(blurb)?,
        })
    }
}
