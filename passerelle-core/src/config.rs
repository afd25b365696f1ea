use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Default file read by [`Config::load_or_default`].
pub const DEFAULT_CONFIG_PATH: &str = "passerelle.yaml";

/// Configuration for the writers and the context retriever.
///
/// Every section is optional in the YAML file; missing values fall back to
/// the defaults the generators were tuned with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub headline: HeadlineConfig,
    #[serde(default)]
    pub rag: RagConfig,
}

/// Which HTTP API the provider talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// OpenAI or any OpenAI-compatible endpoint
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// Connection settings for the LLM backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Sampling settings for the transition generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    #[serde(default = "default_transition_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_transition_max_tokens")]
    pub max_tokens: u32,
    /// Upper bound on few-shot example pairs per call
    #[serde(default = "default_few_shot")]
    pub few_shot: usize,
}

/// Sampling settings for the title/blurb generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlineConfig {
    #[serde(default = "default_headline_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_headline_max_tokens")]
    pub max_tokens: u32,
}

/// Configuration for context retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Number of documents concatenated into the context
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_transition_model() -> String {
    "gpt-4".to_string()
}

fn default_headline_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f64 {
    0.5
}

fn default_transition_max_tokens() -> u32 {
    20
}

fn default_headline_max_tokens() -> u32 {
    100
}

fn default_few_shot() -> usize {
    3
}

fn default_embedding_model() -> String {
    // all-MiniLM-L6-v2
    "all-minilm".to_string()
}

fn default_top_k() -> usize {
    3
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            model: default_transition_model(),
            temperature: default_temperature(),
            max_tokens: default_transition_max_tokens(),
            few_shot: default_few_shot(),
        }
    }
}

impl Default for HeadlineConfig {
    fn default() -> Self {
        Self {
            model: default_headline_model(),
            temperature: default_temperature(),
            max_tokens: default_headline_max_tokens(),
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            top_k: default_top_k(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `passerelle.yaml` if it exists, otherwise use defaults.
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_default()
    }

    /// Serialize the configuration back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
