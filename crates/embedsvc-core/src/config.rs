//! Configuration from the process environment.
//!
//! Everything is read once at startup. Providers are plain strings in the
//! environment and become a [`Provider`]; unknown names are preserved so
//! the embed endpoint can report them as not implemented.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_EMBEDDING_MODEL: &str = "models/gemini-embedding-001";
pub const DEFAULT_RERANK_MODEL: &str = "dragonkue/bge-reranker-v2-m3-ko";
pub const DEFAULT_TARGET_DIMENSION: usize = 768;
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Backend that serves embeddings or rerank scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    Local,
    Ollama,
    Gemini,
    Unsupported(String),
}

impl Provider {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "local" => Self::Local,
            "ollama" => Self::Ollama,
            "gemini" => Self::Gemini,
            _ => Self::Unsupported(value.trim().to_string()),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Ollama => write!(f, "ollama"),
            Self::Gemini => write!(f, "gemini"),
            Self::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

impl Serialize for Provider {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What an embedding is for. Queries get query-side task types and cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Usage {
    #[default]
    Storage,
    Search,
    Query,
    #[serde(other)]
    Other,
}

impl Usage {
    /// Whether the text is a query rather than a stored document.
    pub fn is_query(self) -> bool {
        matches!(self, Self::Search | Self::Query)
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub embedding_provider: Provider,
    pub rerank_provider: Provider,
    pub embedding_model: String,
    pub rerank_model: String,
    /// Embeddings are zero-padded up to this many dimensions.
    pub target_dimension: usize,
    pub query_language: String,
    /// Ollama native API root, without any `/v1` suffix.
    pub ollama_base_url: String,
    #[serde(skip)]
    pub gemini_api_keys: Vec<String>,
    pub gemini_base_url: String,
    pub gemini_output_dimensionality: Option<usize>,
    /// Root directory holding local ONNX models, one subdirectory per model name.
    pub model_dir: PathBuf,
}

impl ServiceConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = match lookup("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{}'", p)))?,
            None => 8000,
        };

        let target_dimension = match lookup("TARGET_DIMENSION") {
            Some(d) => d.trim().parse().map_err(|_| {
                Error::Config(format!("TARGET_DIMENSION must be an integer, got '{}'", d))
            })?,
            None => DEFAULT_TARGET_DIMENSION,
        };

        let gemini_output_dimensionality = match lookup("GEMINI_OUTPUT_DIMENSIONALITY") {
            Some(d) if !d.trim().is_empty() => Some(d.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "GEMINI_OUTPUT_DIMENSIONALITY must be an integer, got '{}'",
                    d
                ))
            })?),
            _ => None,
        };

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            embedding_provider: Provider::parse(&var("EMBEDDING_PROVIDER", "gemini")),
            rerank_provider: Provider::parse(&var("RERANK_PROVIDER", "local")),
            embedding_model: var("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            rerank_model: var("RERANK_MODEL", DEFAULT_RERANK_MODEL),
            target_dimension,
            query_language: var("QUERY_LANGUAGE", "ko"),
            ollama_base_url: ollama_native_url(&var("LOCAL_LLM_BASE_URL", DEFAULT_OLLAMA_BASE_URL)),
            gemini_api_keys: split_keys(&var("GEMINI_API_KEY", "")),
            gemini_base_url: var("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            gemini_output_dimensionality,
            model_dir: PathBuf::from(var("MODEL_DIR", "models")),
        })
    }

    /// Directory a local model is loaded from.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }

    /// Log the effective configuration. Key values are never logged.
    pub fn log_summary(&self) {
        tracing::info!("Using embedding provider: {}", self.embedding_provider);
        tracing::info!("Using rerank provider: {}", self.rerank_provider);
        tracing::info!("Using embedding model: {}", self.embedding_model);
        tracing::info!("Using rerank model: {}", self.rerank_model);
        tracing::info!("Using target dimension: {}", self.target_dimension);
        tracing::info!("Query language: {}", self.query_language);
        if self.embedding_provider == Provider::Ollama || self.rerank_provider == Provider::Ollama {
            tracing::info!("Using Ollama base URL: {}", self.ollama_base_url);
        }
        if self.embedding_provider == Provider::Gemini {
            if self.gemini_api_keys.is_empty() {
                tracing::error!("GEMINI_API_KEY is not set");
            } else {
                tracing::info!(
                    "Gemini API configured with {} keys",
                    self.gemini_api_keys.len()
                );
            }
        }
    }
}

/// Ollama's native API does not live under `/v1`.
fn ollama_native_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    trimmed.strip_suffix("/v1").unwrap_or(trimmed).to_string()
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServiceConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.embedding_provider, Provider::Gemini);
        assert_eq!(config.rerank_provider, Provider::Local);
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.rerank_model, DEFAULT_RERANK_MODEL);
        assert_eq!(config.target_dimension, 768);
        assert_eq!(config.query_language, "ko");
        assert_eq!(config.ollama_base_url, "http://localhost:11434");
        assert!(config.gemini_api_keys.is_empty());
        assert_eq!(config.gemini_output_dimensionality, None);
    }

    #[test]
    fn test_ollama_url_drops_v1_suffix() {
        let config = config_from(&[("LOCAL_LLM_BASE_URL", "http://ollama:11434/v1/")]).unwrap();
        assert_eq!(config.ollama_base_url, "http://ollama:11434");
        assert_eq!(ollama_native_url("http://host/api"), "http://host/api");
    }

    #[test]
    fn test_gemini_keys_split_and_trimmed() {
        let config = config_from(&[("GEMINI_API_KEY", " a, ,b ,c,")]).unwrap();
        assert_eq!(config.gemini_api_keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_target_dimension_is_rejected() {
        let err = config_from(&[("TARGET_DIMENSION", "wide")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!(Provider::parse("Local"), Provider::Local);
        assert_eq!(Provider::parse(" ollama "), Provider::Ollama);
        assert_eq!(Provider::parse("GEMINI"), Provider::Gemini);
        assert_eq!(
            Provider::parse("openai"),
            Provider::Unsupported("openai".to_string())
        );
        assert_eq!(Provider::parse("openai").to_string(), "openai");
    }

    #[test]
    fn test_usage_deserializes_unknown_as_other() {
        let usage: Usage = serde_json::from_str("\"search\"").unwrap();
        assert_eq!(usage, Usage::Search);
        let usage: Usage = serde_json::from_str("\"archive\"").unwrap();
        assert_eq!(usage, Usage::Other);
        assert!(Usage::Query.is_query());
        assert!(!Usage::Storage.is_query());
    }

    #[test]
    fn test_model_path_nests_model_name() {
        let config = config_from(&[("MODEL_DIR", "/opt/models")]).unwrap();
        assert_eq!(
            config.model_path("BAAI/bge-m3"),
            PathBuf::from("/opt/models/BAAI/bge-m3")
        );
    }
}
