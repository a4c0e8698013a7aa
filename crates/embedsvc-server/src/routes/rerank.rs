//! Rerank route.
//!
//! Scoring strategy depends on the rerank provider:
//! - local with a loaded cross-encoder: sigmoid over the pair logit
//! - ollama: cosine similarity of rerank-model embeddings, rescaled to [0, 1]
//! - anything else: input order with strictly decreasing scores

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use embedsvc_core::{Error, Provider, Result};
use embedsvc_infer::{
    clean_query, cosine_similarity, fallback_scores, rank_descending, rescale_cosine, round_score,
    sigmoid, truncate_top_k, CrossEncoderBackend,
};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Object fields checked, in order, for a document's text.
const TEXT_FIELDS: &[&str] = &["text", "content", "document", "page_content"];

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/rerank", post(rerank))
}

#[derive(Debug, Deserialize)]
pub struct RerankRequest {
    pub query: String,
    /// Plain strings, or objects carrying their text in one of `TEXT_FIELDS`.
    pub documents: Vec<serde_json::Value>,
    #[serde(default)]
    pub top_k: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RerankResult {
    pub index: usize,
    pub document: String,
    pub relevance_score: f64,
}

#[derive(Debug, Serialize)]
pub struct RerankResponse {
    pub results: Vec<RerankResult>,
}

/// POST /rerank
async fn rerank(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RerankRequest>,
) -> ApiResult<Json<RerankResponse>> {
    let start = Instant::now();
    debug!(
        "Rerank request received: query length={}, documents count={}, top_k={:?}",
        req.query.len(),
        req.documents.len(),
        req.top_k
    );

    if req.documents.is_empty() {
        debug!("Empty documents list, returning empty results");
        return Ok(Json(RerankResponse { results: Vec::new() }));
    }

    let texts: Vec<String> = req.documents.iter().map(document_text).collect();

    let scored = score_documents(&state, &req.query, &texts)
        .await
        .map_err(|e| {
            warn!("Rerank failed after {:?}", start.elapsed());
            ApiError::rerank(e)
        })?;

    let results: Vec<RerankResult> = scored
        .into_iter()
        .map(|(index, score)| RerankResult {
            index,
            document: texts[index].clone(),
            relevance_score: round_score(score),
        })
        .collect();
    let results = truncate_top_k(results, req.top_k);

    debug!(
        "Rerank completed successfully: returning {} results (total time: {:?})",
        results.len(),
        start.elapsed()
    );
    Ok(Json(RerankResponse { results }))
}

/// Score and order `documents` against `query`, best first.
pub async fn score_documents(
    state: &AppState,
    query: &str,
    documents: &[String],
) -> Result<Vec<(usize, f64)>> {
    let stage = Instant::now();
    let scored = match (&state.rerank_provider, &state.cross_encoder) {
        (Provider::Local, Some(cross_encoder)) => {
            debug!("Using local cross-encoder rerank with model: {}", cross_encoder.model_name());
            rank_with_cross_encoder(cross_encoder.clone(), query, documents).await?
        }
        (Provider::Ollama, _) => {
            debug!("Using Ollama rerank with model: {}", state.config.rerank_model);
            rank_with_ollama(state, query, documents).await?
        }
        _ => {
            warn!("Rerank model not available, using fallback scoring");
            fallback_scores(documents.len())
        }
    };
    debug!("Scoring completed (took {:?})", stage.elapsed());
    Ok(scored)
}

async fn rank_with_cross_encoder(
    cross_encoder: Arc<dyn CrossEncoderBackend>,
    query: &str,
    documents: &[String],
) -> Result<Vec<(usize, f64)>> {
    let query = clean_query(query);
    let documents_len = documents.len();
    let documents = documents.to_vec();
    let logits = tokio::task::spawn_blocking(move || cross_encoder.score(&query, &documents))
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

    if logits.len() != documents_len {
        return Err(Error::Inference(format!(
            "cross-encoder returned {} scores for {} documents",
            logits.len(),
            documents_len
        )));
    }

    Ok(rank_descending(
        logits.into_iter().map(sigmoid).enumerate().collect(),
    ))
}

async fn rank_with_ollama(
    state: &AppState,
    query: &str,
    documents: &[String],
) -> Result<Vec<(usize, f64)>> {
    let model = &state.config.rerank_model;
    let query_embedding = state.ollama_rerank.embed(model, query).await?;

    let doc_embeddings = try_join_all(
        documents
            .iter()
            .map(|doc| state.ollama_rerank.embed(model, doc)),
    )
    .await?;

    let scores = doc_embeddings
        .iter()
        .map(|emb| cosine_similarity(&query_embedding, emb).map(rescale_cosine))
        .collect::<Result<Vec<f64>>>()?;

    Ok(rank_descending(scores.into_iter().enumerate().collect()))
}

/// Extract the text to score from a request document.
pub fn document_text(doc: &serde_json::Value) -> String {
    match doc {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => TEXT_FIELDS
            .iter()
            .find_map(|field| map.get(*field))
            .map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| doc.to_string()),
        other => other.to_string(),
    }
}
