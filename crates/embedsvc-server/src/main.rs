//! embedsvc — embedding and rerank microservice.

use std::sync::Arc;

use embedsvc_core::ServiceConfig;
use embedsvc_server::{build_router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise `LOG_LEVEL`, defaulting to debug.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        EnvFilter::try_new(level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    let config = ServiceConfig::from_env()?;
    config.log_summary();

    let addr = format!("{}:{}", config.host, config.port);

    // Local models load here, before the listener opens.
    let state = Arc::new(AppState::initialize(config)?);
    info!(
        "Active providers: embedding={}, rerank={}",
        state.embedding_provider, state.rerank_provider
    );

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Embedding service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
