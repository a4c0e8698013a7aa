//! ONNX-based embedding engine.
//!
//! Loads a SentenceTransformers ONNX export and its tokenizer. The output
//! dimension is whatever the model produces; it is probed once at load.
//! Requires the `onnx` feature.

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;

    use embedsvc_core::{Error, Result};
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::Tokenizer;
    use tracing::info;

    use crate::embedder::EmbedderBackend;
    use crate::model::{init_runtime, uses_token_type_ids, ModelFiles};

    /// Maximum sequence length for the model.
    const MAX_SEQ_LEN: usize = 512;

    /// ONNX embedding engine.
    pub struct OnnxEmbedder {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        token_type_ids: bool,
        model_name: String,
        dimension: usize,
    }

    impl OnnxEmbedder {
        /// Load an ONNX model and tokenizer from the given directory.
        pub fn load(model_dir: &Path, model_name: &str) -> Result<Self> {
            let files = ModelFiles::locate(model_dir)?;
            init_runtime();

            let session = Session::builder()
                .map_err(|e| Error::Inference(format!("Failed to create session builder: {}", e)))?
                .with_intra_threads(2)
                .map_err(|e| Error::Inference(format!("Failed to set threads: {}", e)))?
                .commit_from_file(&files.model)
                .map_err(|e| Error::Inference(format!("Failed to load ONNX model: {}", e)))?;

            let tokenizer = Tokenizer::from_file(&files.tokenizer)
                .map_err(|e| Error::Inference(format!("Failed to load tokenizer: {}", e)))?;

            let mut embedder = Self {
                session: Mutex::new(session),
                tokenizer,
                token_type_ids: uses_token_type_ids(model_dir),
                model_name: model_name.to_string(),
                dimension: 0,
            };
            embedder.dimension = embedder.infer("dimension probe")?.len();

            info!(
                "ONNX embedder loaded: dim={}, model={}",
                embedder.dimension,
                files.model.display()
            );

            Ok(embedder)
        }

        /// Run inference on tokenized input.
        fn infer(&self, text: &str) -> Result<Vec<f32>> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| Error::Inference(format!("Tokenization failed: {}", e)))?;

            let input_ids = encoding.get_ids();
            let attention_mask = encoding.get_attention_mask();

            // Truncate to max sequence length
            let seq_len = input_ids.len().min(MAX_SEQ_LEN);
            let input_ids = &input_ids[..seq_len];
            let attention_mask = &attention_mask[..seq_len];

            let ids_data: Vec<i64> = input_ids.iter().map(|&id| id as i64).collect();
            let mask_data: Vec<i64> = attention_mask.iter().map(|&m| m as i64).collect();

            let ids_tensor = Tensor::from_array(([1usize, seq_len], ids_data))
                .map_err(|e| Error::Inference(format!("Failed to create ids tensor: {}", e)))?;
            let mask_tensor = Tensor::from_array(([1usize, seq_len], mask_data))
                .map_err(|e| Error::Inference(format!("Failed to create mask tensor: {}", e)))?;

            let mut session = self.session.lock();
            let outputs = if self.token_type_ids {
                let type_ids_tensor = Tensor::from_array(([1usize, seq_len], vec![0i64; seq_len]))
                    .map_err(|e| {
                        Error::Inference(format!("Failed to create type_ids tensor: {}", e))
                    })?;
                session.run(ort::inputs![ids_tensor, mask_tensor, type_ids_tensor])
            } else {
                session.run(ort::inputs![ids_tensor, mask_tensor])
            }
            .map_err(|e| Error::Inference(format!("ONNX inference failed: {}", e)))?;

            // SentenceTransformers models output either:
            //   [1, seq_len, dim] (token_embeddings) → needs mean pooling
            //   [1, dim] (sentence_embedding) → already pooled
            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::Inference(format!("Failed to extract output tensor: {}", e)))?;

            let shape_dims: Vec<i64> = shape.iter().copied().collect();

            match shape_dims.len() {
                3 => {
                    let dim = shape_dims[2] as usize;
                    let mask_f32: Vec<f32> = attention_mask.iter().map(|&m| m as f32).collect();
                    let mask_sum: f32 = mask_f32.iter().sum();
                    if mask_sum < 1e-9 {
                        return Err(Error::Inference("Empty attention mask".to_string()));
                    }

                    // data is laid out as [batch=1][seq_len][dim]
                    let mut pooled = vec![0.0f32; dim];
                    for (i, &m) in mask_f32.iter().enumerate() {
                        if m > 0.0 {
                            let offset = i * dim;
                            for (d, slot) in pooled.iter_mut().enumerate() {
                                *slot += data[offset + d] * m;
                            }
                        }
                    }
                    Ok(pooled.into_iter().map(|v| v / mask_sum).collect())
                }
                2 => {
                    let dim = shape_dims[1] as usize;
                    Ok(data[..dim].to_vec())
                }
                _ => Err(Error::Inference(format!(
                    "Unexpected output shape: {:?}",
                    shape_dims
                ))),
            }
        }
    }

    impl EmbedderBackend for OnnxEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.infer(text)
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn model_name(&self) -> &str {
            &self.model_name
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxEmbedder;
