//! Health and service info routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use embedsvc_core::Provider;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(get_health))
        .route("/info", get(get_info))
}

/// GET /health — liveness plus the active providers and models.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "embedding_provider": state.embedding_provider,
        "rerank_provider": state.rerank_provider,
        "rerank_model": state.config.rerank_model,
        "embedding_model": state.config.embedding_model,
        "query_language": state.config.query_language,
    }))
}

/// GET /info — configuration and which local models are loaded.
async fn get_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let crossencoder_reranking =
        state.rerank_provider == Provider::Local && state.cross_encoder.is_some();

    // Remote embedding providers have no local model to report on.
    let embedding_model_loaded = if state.embedding_provider == Provider::Local {
        serde_json::json!(state.embedder.is_some())
    } else {
        serde_json::json!("external")
    };

    Json(serde_json::json!({
        "service": "Embedding Service",
        "version": env!("CARGO_PKG_VERSION"),
        "features": {
            "korean_optimization": true,
            "crossencoder_reranking": crossencoder_reranking,
        },
        "configuration": {
            "embedding_provider": state.embedding_provider,
            "embedding_model": state.config.embedding_model,
            "rerank_provider": state.rerank_provider,
            "rerank_model": state.config.rerank_model,
            "target_dimension": state.config.target_dimension,
            "query_language": state.config.query_language,
        },
        "models_loaded": {
            "embedding_model": embedding_model_loaded,
            "rerank_model": state.cross_encoder.is_some(),
        },
    }))
}
