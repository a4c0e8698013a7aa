//! Remote embedding providers over HTTP.
//!
//! Ollama serves both plain embeddings and the embeddings behind the
//! similarity-based rerank. Gemini serves embeddings only, rotating API keys.

pub mod gemini;
pub mod ollama;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

use embedsvc_core::{Error, Result};
use tracing::error;

/// Turn a non-success response into `Error::UpstreamStatus`.
async fn ensure_success(service: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    error!("{} API error: {} - {}", service, status, body);
    Err(Error::UpstreamStatus {
        service: service.to_string(),
        status,
        body,
    })
}

fn transport_error(service: &str, err: reqwest::Error) -> Error {
    error!("Failed to get embedding from {}: {}", service, err);
    Error::Upstream {
        service: service.to_string(),
        message: err.to_string(),
    }
}
