//! On-disk model layout shared by the local backends.
//!
//! A model directory holds `model.onnx`, `tokenizer.json` and, for
//! HuggingFace exports, a `config.json` describing the architecture.

use std::path::{Path, PathBuf};

use embedsvc_core::{Error, Result};
use serde::Deserialize;

/// Architectures whose tokenizers emit no segment ids.
const NO_TOKEN_TYPE_MODELS: &[&str] = &["roberta", "xlm-roberta", "camembert", "distilbert"];

/// Located model and tokenizer files.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
}

impl ModelFiles {
    pub fn locate(model_dir: &Path) -> Result<Self> {
        let model = model_dir.join("model.onnx");
        let tokenizer = model_dir.join("tokenizer.json");

        if !model.exists() {
            return Err(Error::ModelUnavailable(format!(
                "Model not found: {}",
                model.display()
            )));
        }
        if !tokenizer.exists() {
            return Err(Error::ModelUnavailable(format!(
                "Tokenizer not found: {}",
                tokenizer.display()
            )));
        }
        Ok(Self { model, tokenizer })
    }
}

#[derive(Deserialize)]
struct ArchitectureConfig {
    model_type: Option<String>,
}

/// Whether the model expects a `token_type_ids` input.
///
/// Read from `config.json`; BERT-style inputs are assumed when it is
/// missing or unreadable.
pub fn uses_token_type_ids(model_dir: &Path) -> bool {
    let model_type = std::fs::read_to_string(model_dir.join("config.json"))
        .ok()
        .and_then(|s| serde_json::from_str::<ArchitectureConfig>(&s).ok())
        .and_then(|c| c.model_type);

    match model_type {
        Some(t) => !NO_TOKEN_TYPE_MODELS.contains(&t.to_lowercase().as_str()),
        None => true,
    }
}

/// Initialize ONNX Runtime once per process.
///
/// With the load-dynamic feature, ORT_DYLIB_PATH must point to libonnxruntime.
#[cfg(feature = "onnx")]
pub(crate) fn init_runtime() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        ort::init().commit();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_requires_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelFiles::locate(dir.path()).unwrap_err();
        assert!(err.to_string().contains("model.onnx"));

        std::fs::write(dir.path().join("model.onnx"), b"").unwrap();
        let err = ModelFiles::locate(dir.path()).unwrap_err();
        assert!(err.to_string().contains("tokenizer.json"));

        std::fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();
        let files = ModelFiles::locate(dir.path()).unwrap();
        assert!(files.model.ends_with("model.onnx"));
    }

    #[test]
    fn test_token_type_detection() {
        let dir = tempfile::tempdir().unwrap();
        assert!(uses_token_type_ids(dir.path()));

        std::fs::write(dir.path().join("config.json"), r#"{"model_type": "xlm-roberta"}"#).unwrap();
        assert!(!uses_token_type_ids(dir.path()));

        std::fs::write(dir.path().join("config.json"), r#"{"model_type": "bert"}"#).unwrap();
        assert!(uses_token_type_ids(dir.path()));

        std::fs::write(dir.path().join("config.json"), "not json").unwrap();
        assert!(uses_token_type_ids(dir.path()));
    }
}
