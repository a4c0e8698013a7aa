//! Gemini `embedContent` with round-robin API keys.

use std::sync::atomic::{AtomicUsize, Ordering};

use embedsvc_core::{Error, Result, Usage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::transport_error;

const SERVICE: &str = "Gemini";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimensionality: Option<usize>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// Gemini task type for a usage hint.
pub fn task_type(usage: Usage) -> &'static str {
    if usage.is_query() {
        "RETRIEVAL_QUERY"
    } else {
        "RETRIEVAL_DOCUMENT"
    }
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    /// Resource name, always `models/...`.
    model: String,
    keys: Vec<String>,
    cursor: AtomicUsize,
    output_dimensionality: Option<usize>,
}

impl GeminiClient {
    pub fn new(client: Client, base_url: &str, model: &str, keys: Vec<String>) -> Self {
        let model = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            keys,
            cursor: AtomicUsize::new(0),
            output_dimensionality: None,
        }
    }

    pub fn with_output_dimensionality(mut self, dimensionality: Option<usize>) -> Self {
        self.output_dimensionality = dimensionality;
        self
    }

    /// Next key in rotation, shared by all requests.
    fn next_key(&self) -> Result<&str> {
        if self.keys.is_empty() {
            return Err(Error::Config("No Gemini API keys configured".to_string()));
        }
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        Ok(&self.keys[slot])
    }

    pub async fn embed(&self, text: &str, usage: Usage) -> Result<Vec<f32>> {
        let key = self.next_key()?;
        let url = format!("{}/v1beta/{}:embedContent", self.base_url, self.model);
        let task_type = task_type(usage);
        debug!("Gemini embedding with model {} ({})", self.model, task_type);

        let request = EmbedContentRequest {
            model: &self.model,
            content: Content {
                parts: [Part { text }],
            },
            task_type,
            output_dimensionality: self.output_dimensionality,
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("{} API error: {} - {}", SERVICE, status, body);
            return Err(Error::Upstream {
                service: SERVICE.to_string(),
                message: format!("{} - {}", status, body),
            });
        }

        let parsed: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        Ok(parsed.embedding.values)
    }
}
