//! Ollama native embeddings API (`POST /api/embeddings`).

use std::time::Duration;

use embedsvc_core::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ensure_success, transport_error};

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

/// Client for one Ollama server.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    label: String,
}

impl OllamaClient {
    pub fn new(client: Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            label: "Ollama".to_string(),
        }
    }

    /// Name used in logs and error messages.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Embed `prompt` with `model`.
    pub async fn embed(&self, model: &str, prompt: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        debug!("{} embedding via {} with model {}", self.label, url, model);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&EmbeddingsRequest { model, prompt })
            .send()
            .await
            .map_err(|e| transport_error(&self.label, e))?;

        let response = ensure_success(&self.label, response).await?;
        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| transport_error(&self.label, e))?;
        Ok(parsed.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedsvc_core::Error;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base: &str) -> OllamaClient {
        OllamaClient::new(Client::new(), base, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_embed_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_json(serde_json::json!({"model": "nomic-embed-text", "prompt": "hello"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"embedding": [0.1, 0.2]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let embedding = client(&format!("{}/", server.uri()))
            .embed("nomic-embed-text", "hello")
            .await
            .unwrap();
        assert_eq!(embedding, vec![0.1, 0.2]);
    }

    #[tokio::test]
    async fn test_embed_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .with_label("Ollama rerank")
            .embed("missing", "hello")
            .await
            .unwrap_err();
        match err {
            Error::UpstreamStatus {
                service,
                status,
                body,
            } => {
                assert_eq!(service, "Ollama rerank");
                assert_eq!(status, 404);
                assert_eq!(body, "model not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_embed_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"oops": 1})))
            .mount(&server)
            .await;

        let err = client(&server.uri()).embed("m", "x").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_embed_unreachable() {
        let err = client("http://127.0.0.1:9").embed("m", "x").await.unwrap_err();
        assert!(err.to_string().starts_with("Ollama request failed"));
    }
}
