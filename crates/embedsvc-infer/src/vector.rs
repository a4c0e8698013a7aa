//! Vector helpers: dimension padding, cosine similarity, sigmoid, query cleanup.

use embedsvc_core::{Error, Result};
use ndarray::ArrayView1;

/// Zero-pad an embedding up to `target` dimensions.
///
/// Vectors already at `target` come back unchanged. Longer vectors are
/// never truncated; they are an error.
pub fn pad_to_dimension(mut embedding: Vec<f32>, target: usize) -> Result<Vec<f32>> {
    let current = embedding.len();
    if current > target {
        return Err(Error::DimensionExceeded {
            actual: current,
            max: target,
        });
    }
    embedding.resize(target, 0.0);
    Ok(embedding)
}

/// Cosine similarity in `[-1, 1]`. Zero-norm inputs score 0.
///
/// Vectors of different lengths are an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::Inference(format!(
            "dimension mismatch in cosine similarity: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    let a = ArrayView1::from(a).mapv(f64::from);
    let b = ArrayView1::from(b).mapv(f64::from);

    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(a.dot(&b) / (norm_a * norm_b))
}

/// Map a cosine similarity from `[-1, 1]` onto `[0, 1]`.
pub fn rescale_cosine(similarity: f64) -> f64 {
    (similarity + 1.0) / 2.0
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Trim a query and collapse internal whitespace runs to single spaces.
pub fn clean_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}
