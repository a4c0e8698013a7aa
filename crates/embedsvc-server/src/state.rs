//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use embedsvc_core::{Provider, Result, ServiceConfig};
use embedsvc_infer::{CrossEncoderBackend, EmbedderBackend};
use embedsvc_remote::{GeminiClient, OllamaClient};
use tracing::{error, info};

/// Timeout for plain Ollama embedding calls.
const OLLAMA_EMBED_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for the per-document embedding calls behind Ollama reranking.
const OLLAMA_RERANK_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared application state accessible from all route handlers.
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: ServiceConfig,
    /// Effective embedding provider, after any startup fallback.
    pub embedding_provider: Provider,
    /// Effective rerank provider, after any startup fallback.
    pub rerank_provider: Provider,
    pub embedder: Option<Arc<dyn EmbedderBackend>>,
    pub cross_encoder: Option<Arc<dyn CrossEncoderBackend>>,
    pub ollama: OllamaClient,
    pub ollama_rerank: OllamaClient,
    pub gemini: GeminiClient,
}

impl AppState {
    /// Build state around already-resolved providers and backends.
    pub fn new(
        config: ServiceConfig,
        embedding_provider: Provider,
        rerank_provider: Provider,
        embedder: Option<Arc<dyn EmbedderBackend>>,
        cross_encoder: Option<Arc<dyn CrossEncoderBackend>>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| embedsvc_core::Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let ollama = OllamaClient::new(client.clone(), &config.ollama_base_url, OLLAMA_EMBED_TIMEOUT);
        let ollama_rerank = OllamaClient::new(client.clone(), &config.ollama_base_url, OLLAMA_RERANK_TIMEOUT)
            .with_label("Ollama rerank");
        let gemini = GeminiClient::new(
            client,
            &config.gemini_base_url,
            &config.embedding_model,
            config.gemini_api_keys.clone(),
        )
        .with_output_dimensionality(config.gemini_output_dimensionality);

        Ok(Self {
            config,
            embedding_provider,
            rerank_provider,
            embedder,
            cross_encoder,
            ollama,
            ollama_rerank,
            gemini,
        })
    }

    /// Load whatever local models the configuration asks for.
    ///
    /// A local provider whose model fails to load is switched to Ollama.
    pub fn initialize(config: ServiceConfig) -> Result<Self> {
        let (embedding_provider, embedder) =
            resolve_local("embedding", &config.embedding_provider, || {
                embedsvc_infer::load_embedder(
                    &config.model_path(&config.embedding_model),
                    &config.embedding_model,
                )
            });
        let (rerank_provider, cross_encoder) =
            resolve_local("rerank", &config.rerank_provider, || {
                embedsvc_infer::load_cross_encoder(
                    &config.model_path(&config.rerank_model),
                    &config.rerank_model,
                )
            });

        Self::new(
            config,
            embedding_provider,
            rerank_provider,
            embedder,
            cross_encoder,
        )
    }
}

/// Load a local model if `provider` is local; fall back to Ollama on failure.
pub fn resolve_local<T>(
    role: &str,
    provider: &Provider,
    load: impl FnOnce() -> Result<T>,
) -> (Provider, Option<T>) {
    if *provider != Provider::Local {
        return (provider.clone(), None);
    }
    match load() {
        Ok(model) => {
            info!("Loaded local {} model", role);
            (Provider::Local, Some(model))
        }
        Err(e) => {
            error!("Failed to load local {} model: {}", role, e);
            info!("Falling back to Ollama provider for {}", role);
            (Provider::Ollama, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedsvc_core::Error;

    #[test]
    fn test_resolve_local_keeps_remote_providers() {
        let (provider, model) = resolve_local::<u8>("embedding", &Provider::Gemini, || {
            panic!("remote providers never load a model")
        });
        assert_eq!(provider, Provider::Gemini);
        assert!(model.is_none());
    }

    #[test]
    fn test_resolve_local_loads_model() {
        let (provider, model) = resolve_local("rerank", &Provider::Local, || Ok(7u8));
        assert_eq!(provider, Provider::Local);
        assert_eq!(model, Some(7));
    }

    #[test]
    fn test_resolve_local_falls_back_to_ollama() {
        let (provider, model) = resolve_local::<u8>("rerank", &Provider::Local, || {
            Err(Error::ModelUnavailable("missing".into()))
        });
        assert_eq!(provider, Provider::Ollama);
        assert!(model.is_none());
    }
}
