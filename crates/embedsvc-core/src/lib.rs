//! embedsvc core — environment configuration, provider selection, errors.

pub mod config;
pub mod error;

pub use config::{Provider, ServiceConfig, Usage};
pub use error::{Error, Result};
