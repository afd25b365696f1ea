//! In-memory providers and a loopback HTTP server used by unit tests.

use crate::provider::{ChatRequest, ChatResponse, Choice, Message, Provider, ProviderError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const DIMENSION: usize = 64;

/// Records every request and answers without touching the network.
///
/// Embeddings are hashed bags of lowercase words, L2-normalized, so texts
/// sharing words land close together.
pub(crate) struct MockProvider {
    replies: Vec<String>,
    drop_last_embedding: bool,
    requests: Mutex<Vec<ChatRequest>>,
    embedded_models: Mutex<Vec<String>>,
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        Self {
            replies: vec!["Par ailleurs,".to_string()],
            drop_last_embedding: false,
            requests: Mutex::new(Vec::new()),
            embedded_models: Mutex::new(Vec::new()),
        }
    }

    /// Replies with the given choices, in order. An empty list yields no choices.
    pub(crate) fn with_replies(mut self, replies: &[&str]) -> Self {
        self.replies = replies.iter().map(|r| r.to_string()).collect();
        self
    }

    pub(crate) fn dropping_last_embedding(mut self) -> Self {
        self.drop_last_embedding = true;
        self
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> ChatRequest {
        self.requests().pop().expect("no chat request recorded")
    }

    pub(crate) fn embedded_models(&self) -> Vec<String> {
        self.embedded_models.lock().unwrap().clone()
    }

    pub(crate) fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = fnv1a(&word.to_lowercase()) % DIMENSION as u64;
            vector[bucket as usize] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf29ce484222325u64, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        Ok(ChatResponse {
            model,
            choices: self
                .replies
                .iter()
                .enumerate()
                .map(|(index, reply)| Choice {
                    index: index as u32,
                    message: Message::assistant(reply.clone()),
                })
                .collect(),
        })
    }

    async fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        self.embedded_models.lock().unwrap().push(model.to_string());
        Ok(Self::vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str], model: &str) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text, model).await?);
        }
        if self.drop_last_embedding {
            vectors.pop();
        }
        Ok(vectors)
    }
}

/// Provider whose every call fails, for error propagation tests.
pub(crate) struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse> {
        Err(ProviderError::Api {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }

    async fn embed(&self, _text: &str, _model: &str) -> Result<Vec<f32>> {
        Err(ProviderError::NoEmbeddings)
    }
}

/// Answers one connection per canned `(status, body)` reply, in order, on a
/// loopback port. Resolves to the raw text of every request it received.
pub(crate) async fn serve(replies: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut received = Vec::with_capacity(replies.len());
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().await.unwrap();
            received.push(read_request(&mut stream).await);

            let response = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        received
    });

    (base_url, handle)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// HTTP client that ignores proxy environment variables, for [`serve`].
pub(crate) fn loopback_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// JSON body of a raw HTTP request captured by [`serve`].
pub(crate) fn request_json(raw: &str) -> serde_json::Value {
    let (_, body) = raw.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}
