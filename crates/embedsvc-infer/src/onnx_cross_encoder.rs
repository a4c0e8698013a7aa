//! ONNX cross-encoder for reranking.
//!
//! Scores each (query, document) pair through a sequence-classification
//! head and returns the raw logit. Requires the `onnx` feature.

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;

    use embedsvc_core::{Error, Result};
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::{Tokenizer, TruncationParams};
    use tracing::{debug, info};

    use crate::embedder::CrossEncoderBackend;
    use crate::model::{init_runtime, uses_token_type_ids, ModelFiles};

    const MAX_SEQ_LEN: usize = 512;

    pub struct OnnxCrossEncoder {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        token_type_ids: bool,
        model_name: String,
    }

    impl OnnxCrossEncoder {
        /// Load a cross-encoder exported with `model.onnx` + `tokenizer.json`.
        pub fn load(model_dir: &Path, model_name: &str) -> Result<Self> {
            let files = ModelFiles::locate(model_dir)?;
            init_runtime();

            let session = Session::builder()
                .map_err(|e| Error::Inference(format!("Failed to create session builder: {}", e)))?
                .with_intra_threads(2)
                .map_err(|e| Error::Inference(format!("Failed to set threads: {}", e)))?
                .commit_from_file(&files.model)
                .map_err(|e| Error::Inference(format!("Failed to load ONNX model: {}", e)))?;

            let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
                .map_err(|e| Error::Inference(format!("Failed to load tokenizer: {}", e)))?;
            tokenizer
                .with_truncation(Some(TruncationParams {
                    max_length: MAX_SEQ_LEN,
                    ..Default::default()
                }))
                .map_err(|e| Error::Inference(format!("Failed to set truncation: {}", e)))?;

            let token_type_ids = uses_token_type_ids(model_dir);
            info!(
                "ONNX cross-encoder loaded: model={}, token_type_ids={}",
                files.model.display(),
                token_type_ids
            );

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                token_type_ids,
                model_name: model_name.to_string(),
            })
        }

        fn score_pair(&self, query: &str, document: &str) -> Result<f64> {
            let encoding = self
                .tokenizer
                .encode((query, document), true)
                .map_err(|e| Error::Inference(format!("Tokenization failed: {}", e)))?;

            let seq_len = encoding.get_ids().len();
            let ids_data: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let mask_data: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();

            let ids_tensor = Tensor::from_array(([1usize, seq_len], ids_data))
                .map_err(|e| Error::Inference(format!("Failed to create ids tensor: {}", e)))?;
            let mask_tensor = Tensor::from_array(([1usize, seq_len], mask_data))
                .map_err(|e| Error::Inference(format!("Failed to create mask tensor: {}", e)))?;

            let mut session = self.session.lock();
            let outputs = if self.token_type_ids {
                let type_data: Vec<i64> =
                    encoding.get_type_ids().iter().map(|&t| t as i64).collect();
                let type_ids_tensor = Tensor::from_array(([1usize, seq_len], type_data))
                    .map_err(|e| {
                        Error::Inference(format!("Failed to create type_ids tensor: {}", e))
                    })?;
                session.run(ort::inputs![ids_tensor, mask_tensor, type_ids_tensor])
            } else {
                session.run(ort::inputs![ids_tensor, mask_tensor])
            }
            .map_err(|e| Error::Inference(format!("ONNX inference failed: {}", e)))?;

            // Logits are [1, num_labels].
            let (_, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::Inference(format!("Failed to extract logits: {}", e)))?;

            match data.len() {
                0 => Err(Error::Inference("Cross-encoder produced no logits".to_string())),
                1 => Ok(f64::from(data[0])),
                // Two-label heads: the positive-class margin, so sigmoid matches softmax.
                _ => Ok(f64::from(data[1]) - f64::from(data[0])),
            }
        }
    }

    impl CrossEncoderBackend for OnnxCrossEncoder {
        fn score(&self, query: &str, documents: &[String]) -> Result<Vec<f64>> {
            debug!("Cross-encoding {} pairs", documents.len());
            documents
                .iter()
                .map(|doc| self.score_pair(query, doc))
                .collect()
        }

        fn model_name(&self) -> &str {
            &self.model_name
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxCrossEncoder;
