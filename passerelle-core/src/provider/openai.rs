//! OpenAI-compatible provider implementation.
//!
//! Talks to `/chat/completions` and `/embeddings` on any endpoint that speaks
//! the OpenAI wire format.

use super::types::*;
use crate::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAI HTTP API provider.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a provider, reading the API key from the environment variable
    /// named in `config.api_key_env`.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ProviderError::MissingApiKey(config.api_key_env.clone()))?;
        Ok(Self::with_api_key(&config.base_url, api_key))
    }

    pub fn with_api_key(base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http_client: reqwest::Client::new(),
        }
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            max_tokens = request.max_tokens,
            "Sending chat completion request"
        );
        self.post("chat/completions", &OpenAiChatRequest::from(&request))
            .await
    }

    async fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text], model)
            .await?
            .into_iter()
            .next()
            .ok_or(ProviderError::NoEmbeddings)
    }

    async fn embed_batch(&self, texts: &[&str], model: &str) -> Result<Vec<Vec<f32>>> {
        let request = OpenAiEmbedRequest {
            model,
            input: texts.to_vec(),
        };
        let response: OpenAiEmbedResponse = self.post("embeddings", &request).await?;
        into_ordered_vectors(response, texts.len())
    }
}

/// The embeddings endpoint tags every vector with its input position;
/// restore input order before handing the vectors back.
fn into_ordered_vectors(response: OpenAiEmbedResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut data = response.data;
    if data.is_empty() {
        return Err(ProviderError::NoEmbeddings);
    }
    if data.len() != expected {
        return Err(ProviderError::Other(format!(
            "Expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

// OpenAI-specific request/response types (internal)

#[derive(Debug, Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
    max_tokens: u32,
}

impl<'a> From<&'a ChatRequest> for OpenAiChatRequest<'a> {
    fn from(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbedResponse {
    #[serde(default)]
    data: Vec<OpenAiEmbedding>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbedding {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{loopback_client, request_json, serve};

    #[test]
    fn test_chat_request_wire_format() {
        let request = ChatRequest::new("gpt-4", vec![Message::system("sys"), Message::user("q")])
            .with_temperature(0.5)
            .with_max_tokens(20);
        let json = serde_json::to_value(OpenAiChatRequest::from(&request)).unwrap();

        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["max_tokens"], 20);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "q");
    }

    #[test]
    fn test_chat_response_parses_openai_body() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "gpt-4-0613",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": " Côté culture, "}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.first_text().unwrap(), "Côté culture,");
    }

    #[test]
    fn test_embeddings_reordered_by_index() {
        let body = r#"{"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]}
        ]}"#;
        let response: OpenAiEmbedResponse = serde_json::from_str(body).unwrap();
        let vectors = into_ordered_vectors(response, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_embeddings_empty_data() {
        let response: OpenAiEmbedResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(matches!(
            into_ordered_vectors(response, 1),
            Err(ProviderError::NoEmbeddings)
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let config = LlmConfig {
            api_key_env: "PASSERELLE_TEST_UNSET_KEY".to_string(),
            ..LlmConfig::default()
        };
        let err = OpenAiProvider::new(&config).unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey(name) if name == "PASSERELLE_TEST_UNSET_KEY"));
    }

    #[tokio::test]
    async fn test_error_status_then_success_over_http() {
        let ok = r#"{"model": "gpt-4", "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "Côté sport,"}}
        ]}"#;
        let (base_url, server) = serve(vec![
            (500, "upstream overloaded".to_string()),
            (200, ok.to_string()),
        ])
        .await;
        let provider = OpenAiProvider {
            http_client: loopback_client(),
            ..OpenAiProvider::with_api_key(&base_url, "sk-test")
        };
        let request = ChatRequest::new("gpt-4", vec![Message::user("q")]).with_max_tokens(20);

        let err = provider.complete(request.clone()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 500, body } if body == "upstream overloaded"));

        let response = provider.complete(request).await.unwrap();
        assert_eq!(response.first_text().unwrap(), "Côté sport,");

        let received = server.await.unwrap();
        assert_eq!(received.len(), 2);
        for raw in &received {
            assert!(raw.starts_with("POST /chat/completions "));
            assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
            assert_eq!(request_json(raw)["max_tokens"], 20);
        }
    }

    #[tokio::test]
    async fn test_embeddings_over_http() {
        let body = r#"{"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]}
        ]}"#;
        let (base_url, server) = serve(vec![(200, body.to_string())]).await;
        let provider = OpenAiProvider {
            http_client: loopback_client(),
            ..OpenAiProvider::with_api_key(&format!("{base_url}/"), "sk-test")
        };

        let vectors = provider
            .embed_batch(&["Paris", "Lyon"], "text-embedding-3-small")
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

        let received = server.await.unwrap();
        assert!(received[0].starts_with("POST /embeddings "));
        let json = request_json(&received[0]);
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["input"], serde_json::json!(["Paris", "Lyon"]));
    }
}
