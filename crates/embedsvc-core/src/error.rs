//! Error types for embedsvc.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("{0}")]
    ModelUnavailable(String),

    #[error("Provider {0} not implemented")]
    NotImplemented(String),

    /// Upstream answered with a non-success status.
    #[error("{service} API error: {status} - {body}")]
    UpstreamStatus {
        service: String,
        status: u16,
        body: String,
    },

    /// Upstream could not be reached, returned something unreadable, or
    /// failed in a way that is not passed through as a gateway error.
    #[error("{service} request failed: {message}")]
    Upstream { service: String, message: String },

    #[error("Embedding dimension {actual} exceeds maximum supported dimension {max}")]
    DimensionExceeded { actual: usize, max: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
