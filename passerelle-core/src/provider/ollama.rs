//! Ollama provider implementation.
//!
//! This module provides an Ollama HTTP API client that implements the Provider trait.

use super::types::*;
use crate::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ollama HTTP API provider.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    base_url: String,
    http_client: reqwest::Client,
}

impl OllamaProvider {
    /// Creates a new Ollama provider for the configured base URL.
    pub fn new(config: &LlmConfig) -> Self {
        Self::with_base_url(&config.base_url)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self.http_client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        Ok(response.json::<R>().await?)
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::with_base_url("http://localhost:11434")
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending Ollama chat request"
        );

        let ollama_request = OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response: OllamaChatResponse = self.post("api/chat", &ollama_request).await?;
        Ok(response.into())
    }

    async fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text], model)
            .await?
            .into_iter()
            .next()
            .ok_or(ProviderError::NoEmbeddings)
    }

    async fn embed_batch(&self, texts: &[&str], model: &str) -> Result<Vec<Vec<f32>>> {
        let embed_request = OllamaEmbedRequest {
            model,
            input: texts.to_vec(),
        };
        let response: OllamaEmbedResponse = self.post("api/embed", &embed_request).await?;

        if response.embeddings.is_empty() {
            return Err(ProviderError::NoEmbeddings);
        }
        Ok(response.embeddings)
    }
}

// Ollama-specific request/response types (internal)

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: Message,
}

impl From<OllamaChatResponse> for ChatResponse {
    fn from(response: OllamaChatResponse) -> Self {
        // Ollama returns exactly one candidate per request.
        ChatResponse {
            model: response.model,
            choices: vec![Choice {
                index: 0,
                message: response.message,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{loopback_client, request_json, serve};

    #[test]
    fn test_chat_request_maps_sampling_options() {
        let messages = vec![Message::user("Bonjour")];
        let request = OllamaChatRequest {
            model: "mistral",
            messages: &messages,
            stream: false,
            options: OllamaOptions {
                temperature: 0.5,
                num_predict: 20,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 20);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_chat_response_becomes_single_choice() {
        let body = r#"{
            "model": "mistral",
            "created_at": "2024-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": "Pour finir,"},
            "done": true
        }"#;
        let response: ChatResponse = serde_json::from_str::<OllamaChatResponse>(body)
            .unwrap()
            .into();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.first_text().unwrap(), "Pour finir,");
    }

    #[test]
    fn test_embed_response_defaults_to_empty() {
        let response: OllamaEmbedResponse = serde_json::from_str(r#"{"model": "all-minilm"}"#).unwrap();
        assert!(response.embeddings.is_empty());
    }

    #[tokio::test]
    async fn test_chat_error_status_then_success_over_http() {
        let ok = r#"{"model": "mistral", "message": {"role": "assistant", "content": "Pour finir,"}, "done": true}"#;
        let (base_url, server) = serve(vec![
            (500, r#"{"error": "model not loaded"}"#.to_string()),
            (200, ok.to_string()),
        ])
        .await;
        let provider = OllamaProvider {
            http_client: loopback_client(),
            ..OllamaProvider::with_base_url(&base_url)
        };
        let request = ChatRequest::new("mistral", vec![Message::user("q")])
            .with_temperature(0.5)
            .with_max_tokens(20);

        let err = provider.complete(request.clone()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 500, body } if body.contains("model not loaded")));

        let response = provider.complete(request).await.unwrap();
        assert_eq!(response.first_text().unwrap(), "Pour finir,");

        let received = server.await.unwrap();
        assert!(received[1].starts_with("POST /api/chat "));
        let json = request_json(&received[1]);
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 20);
    }

    #[tokio::test]
    async fn test_embed_sends_array_input_over_http() {
        let (base_url, server) =
            serve(vec![(200, r#"{"model": "all-minilm", "embeddings": [[0.5, 0.5]]}"#.to_string())]).await;
        let provider = OllamaProvider {
            http_client: loopback_client(),
            ..OllamaProvider::with_base_url(&base_url)
        };

        let vector = provider.embed("Bonjour", "all-minilm").await.unwrap();
        assert_eq!(vector, vec![0.5, 0.5]);

        let received = server.await.unwrap();
        assert!(received[0].starts_with("POST /api/embed "));
        let json = request_json(&received[0]);
        assert_eq!(json["model"], "all-minilm");
        assert_eq!(json["input"], serde_json::json!(["Bonjour"]));
    }

    #[tokio::test]
    async fn test_empty_embeddings_over_http() {
        let (base_url, server) = serve(vec![(200, r#"{"embeddings": []}"#.to_string())]).await;
        let provider = OllamaProvider {
            http_client: loopback_client(),
            ..OllamaProvider::with_base_url(&base_url)
        };

        let err = provider.embed("Bonjour", "all-minilm").await.unwrap_err();
        assert!(matches!(err, ProviderError::NoEmbeddings));
        server.await.unwrap();
    }
}
