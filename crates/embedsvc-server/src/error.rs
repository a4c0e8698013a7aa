//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use embedsvc_core::Error;
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotImplemented(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(#[source] Error),

    #[error("Reranking failed: {0}")]
    Rerank(#[source] Error),
}

impl ApiError {
    /// Classify a failure from the embedding path.
    pub fn embedding(err: Error) -> Self {
        match err {
            Error::NotImplemented(_) => Self::NotImplemented(err.to_string()),
            Error::ModelUnavailable(_) => Self::Unavailable(err.to_string()),
            other => Self::Embedding(other),
        }
    }

    pub fn rerank(err: Error) -> Self {
        Self::Rerank(err)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Embedding(Error::UpstreamStatus { .. }) => StatusCode::BAD_GATEWAY,
            Self::Embedding(_) | Self::Rerank(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!("{}", self);
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                ApiError::embedding(Error::NotImplemented("cohere".into())),
                StatusCode::NOT_IMPLEMENTED,
            ),
            (
                ApiError::embedding(Error::ModelUnavailable("gone".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::embedding(Error::UpstreamStatus {
                    service: "Ollama".into(),
                    status: 404,
                    body: String::new(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::embedding(Error::Upstream {
                    service: "Gemini".into(),
                    message: "429 - quota".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::embedding(Error::DimensionExceeded { actual: 9, max: 4 }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::rerank(Error::UpstreamStatus {
                    service: "Ollama rerank".into(),
                    status: 502,
                    body: String::new(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_messages() {
        let err = ApiError::embedding(Error::NotImplemented("cohere".into()));
        assert_eq!(err.to_string(), "Provider cohere not implemented");
        let err = ApiError::embedding(Error::DimensionExceeded { actual: 9, max: 4 });
        assert_eq!(
            err.to_string(),
            "Embedding generation failed: Embedding dimension 9 exceeds maximum supported dimension 4"
        );
    }
}
