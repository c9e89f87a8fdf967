//! climasense sentence encoder
//!
//! Turns cleaned text into fixed-width dense vectors that the downstream
//! classifiers consume. Two backends:
//!
//! - **ONNX mode** - Run a transformer encoder locally. Requires an ONNX export
//!   and its `tokenizer.json`.
//! - **Stub mode** - For tests and dry runs. Generates fake but consistent
//!   vectors of the configured width.
//!
//! There is no fallback between them. A missing model file in ONNX mode is a
//! load error, never a silent switch to stub vectors; the classifiers were fit
//! on real encoder output and stub vectors would produce confident garbage.
//!
//! ## Resource model
//!
//! Weights load once in [`load_encoder`] and stay resident. `encode` takes
//! `&self`; the returned `Arc` is shared by every request. Each call tokenizes
//! its texts as one padded batch (truncated to `max_sequence_length`) and runs
//! a single forward pass.
//!
//! ## Quick example
//!
//! ```
//! use semantic::{load_encoder, EncoderConfig};
//!
//! let cfg = EncoderConfig {
//!     mode: "stub".into(),
//!     embedding_dim: 16,
//!     ..Default::default()
//! };
//! let encoder = load_encoder(&cfg).unwrap();
//! let vectors = encoder.encode(&["warmest decade on record"]).unwrap();
//! assert_eq!(vectors[0].dim(), 16);
//! ```
//!
//! The [`runtime`] module is public so other stages that run ONNX text
//! models (the emotion classifier) share the same loading path.

pub mod config;
pub mod error;
pub mod runtime;
pub mod types;

mod onnx;
mod stub;

pub use crate::config::EncoderConfig;
pub use crate::error::SemanticError;
pub use crate::onnx::OnnxEncoder;
pub use crate::stub::StubEncoder;
pub use crate::types::{Embedding, TextEncoder};

use std::sync::Arc;

/// Builds the encoder selected by `cfg.mode`.
pub fn load_encoder(cfg: &EncoderConfig) -> Result<Arc<dyn TextEncoder>, SemanticError> {
    cfg.validate()?;
    let encoder: Arc<dyn TextEncoder> = match cfg.mode.as_str() {
        "stub" => {
            tracing::warn!(
                dim = cfg.embedding_dim,
                "using stub encoder; vectors carry no meaning"
            );
            Arc::new(StubEncoder::from_config(cfg)?)
        }
        _ => Arc::new(OnnxEncoder::load(cfg)?),
    };
    Ok(encoder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn stub_mode_loads_without_assets() {
        let cfg = EncoderConfig {
            mode: "stub".into(),
            model_path: PathBuf::from("/nonexistent/model.onnx"),
            ..Default::default()
        };
        let encoder = load_encoder(&cfg).unwrap();
        assert_eq!(encoder.dimension(), 768);
    }

    #[test]
    fn onnx_mode_does_not_fall_back_to_stub() {
        let cfg = EncoderConfig {
            model_path: PathBuf::from("./missing/model.onnx"),
            tokenizer_path: PathBuf::from("./missing/tokenizer.json"),
            ..Default::default()
        };
        let err = load_encoder(&cfg).err().expect("missing assets must fail");
        assert!(matches!(err, SemanticError::ModelNotFound(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn stub_encoding_is_deterministic() {
        let cfg = EncoderConfig {
            mode: "stub".into(),
            ..Default::default()
        };
        let encoder = load_encoder(&cfg).unwrap();
        let a = encoder.encode(&["big cat"]).unwrap();
        let b = encoder.encode(&["big cat"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    #[ignore = "requires local ONNX + tokenizer assets under models/"]
    fn real_model_inference() {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let workspace_root = manifest_dir
            .parent()
            .and_then(|p| p.parent())
            .expect("workspace root");
        let model_dir = workspace_root
            .join("models")
            .join("distilroberta-base-climate-f");

        let cfg = EncoderConfig {
            model_path: model_dir.join("model.onnx"),
            tokenizer_path: model_dir.join("tokenizer.json"),
            ..Default::default()
        };

        let encoder = load_encoder(&cfg).expect("model assets present");
        let long_text = "warming ".repeat(1000);
        let vectors = encoder
            .encode(&["climate change real", "", &long_text])
            .expect("inference should succeed with real model");
        assert_eq!(vectors.len(), 3);
        assert!(vectors.iter().all(|v| v.dim() == cfg.embedding_dim));

        let first = encoder.encode(&["climate change real"]).unwrap();
        let second = encoder.encode(&["climate change real"]).unwrap();
        assert_eq!(first, second);
    }
}
