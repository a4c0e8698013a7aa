//! Embedding route: one provider per process, optional dimension padding.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use embedsvc_core::{Error, Provider, Result, Usage};
use embedsvc_infer::{clean_query, pad_to_dimension};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/embed", post(embed))
}

#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    pub content: String,
    /// Pad to the configured target dimension.
    #[serde(default = "default_normalize")]
    pub normalize: bool,
    #[serde(default)]
    pub usage: Usage,
}

fn default_normalize() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
    pub dimension: usize,
}

/// POST /embed
async fn embed(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmbedRequest>,
) -> ApiResult<Json<EmbedResponse>> {
    let mut embedding = generate_embedding(&state, &req.content, req.usage)
        .await
        .map_err(ApiError::embedding)?;

    if req.normalize {
        embedding =
            pad_to_dimension(embedding, state.config.target_dimension).map_err(ApiError::embedding)?;
    }

    Ok(Json(EmbedResponse {
        dimension: embedding.len(),
        embedding,
    }))
}

/// Embed `text` with the active embedding provider.
pub async fn generate_embedding(state: &AppState, text: &str, usage: Usage) -> Result<Vec<f32>> {
    match &state.embedding_provider {
        Provider::Ollama => state.ollama.embed(&state.config.embedding_model, text).await,
        Provider::Gemini => state.gemini.embed(&prepare_text(text, usage), usage).await,
        Provider::Local => {
            let embedder = state.embedder.clone().ok_or_else(|| {
                Error::ModelUnavailable("Local embedding model not available".to_string())
            })?;
            let text = prepare_text(text, usage);
            debug!("Local embedding with {}", embedder.model_name());
            tokio::task::spawn_blocking(move || embedder.embed(&text))
                .await
                .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
        }
        Provider::Unsupported(name) => Err(Error::NotImplemented(name.clone())),
    }
}

/// Search queries are cleaned up before embedding; stored text is left alone.
fn prepare_text(text: &str, usage: Usage) -> String {
    if usage == Usage::Search {
        clean_query(text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req: EmbedRequest = serde_json::from_str(r#"{"content": "hello"}"#).unwrap();
        assert!(req.normalize);
        assert_eq!(req.usage, Usage::Storage);
    }

    #[test]
    fn test_prepare_text_only_cleans_search() {
        assert_eq!(prepare_text("  a   b ", Usage::Search), "a b");
        assert_eq!(prepare_text("  a   b ", Usage::Query), "  a   b ");
        assert_eq!(prepare_text("  a   b ", Usage::Storage), "  a   b ");
    }
}
