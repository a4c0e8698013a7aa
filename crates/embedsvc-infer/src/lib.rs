//! embedsvc infer — local models, vector math, rank scoring.
//!
//! Provides the `EmbedderBackend` and `CrossEncoderBackend` traits. When the
//! `onnx` feature is enabled and model files are present, `OnnxEmbedder` and
//! `OnnxCrossEncoder` serve them. Without it, loading fails and the server
//! falls back to a remote provider.

pub mod embedder;
pub mod model;
pub mod onnx_cross_encoder;
pub mod onnx_embedder;
pub mod scoring;
pub mod vector;

pub use embedder::{CrossEncoderBackend, EmbedderBackend};
pub use scoring::{fallback_scores, rank_descending, round_score, truncate_top_k};
pub use vector::{clean_query, cosine_similarity, pad_to_dimension, rescale_cosine, sigmoid};

#[cfg(feature = "onnx")]
pub use onnx_cross_encoder::OnnxCrossEncoder;
#[cfg(feature = "onnx")]
pub use onnx_embedder::OnnxEmbedder;

use std::path::Path;
use std::sync::Arc;

use embedsvc_core::Result;

/// Load a local embedding model from `model_dir`.
pub fn load_embedder(model_dir: &Path, model_name: &str) -> Result<Arc<dyn EmbedderBackend>> {
    #[cfg(feature = "onnx")]
    {
        let embedder = OnnxEmbedder::load(model_dir, model_name)?;
        tracing::info!("Using ONNX embedder (dim={})", embedder.dimension());
        Ok(Arc::new(embedder))
    }

    #[cfg(not(feature = "onnx"))]
    {
        let _ = model_dir;
        Err(embedsvc_core::Error::ModelUnavailable(format!(
            "ONNX feature disabled, cannot load {}",
            model_name
        )))
    }
}

/// Load a local cross-encoder from `model_dir`.
pub fn load_cross_encoder(
    model_dir: &Path,
    model_name: &str,
) -> Result<Arc<dyn CrossEncoderBackend>> {
    #[cfg(feature = "onnx")]
    {
        Ok(Arc::new(OnnxCrossEncoder::load(model_dir, model_name)?))
    }

    #[cfg(not(feature = "onnx"))]
    {
        let _ = model_dir;
        Err(embedsvc_core::Error::ModelUnavailable(format!(
            "ONNX feature disabled, cannot load {}",
            model_name
        )))
    }
}
