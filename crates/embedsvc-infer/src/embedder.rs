//! Local model traits.
//!
//! Both traits are synchronous: implementations run inference on the
//! calling thread, so async callers move them onto the blocking pool.
//! Implementations:
//! - `OnnxEmbedder`: SentenceTransformers-style embedding model (feature `onnx`)
//! - `OnnxCrossEncoder`: sequence-classification reranker (feature `onnx`)

use embedsvc_core::Result;

/// Trait for local embedding backends.
pub trait EmbedderBackend: Send + Sync {
    /// Generate an embedding for a text string.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Name the model was loaded under.
    fn model_name(&self) -> &str;
}

/// Trait for local cross-encoder backends.
pub trait CrossEncoderBackend: Send + Sync {
    /// Score each `(query, document)` pair jointly.
    ///
    /// Returns one raw relevance logit per document, in input order.
    fn score(&self, query: &str, documents: &[String]) -> Result<Vec<f64>>;

    fn model_name(&self) -> &str;
}
