use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SemanticError;

/// Runtime configuration describing which encoder to load and how to pool its output.
///
/// # Example
/// ```no_run
/// use semantic::{load_encoder, EncoderConfig};
/// use std::path::PathBuf;
///
/// let cfg = EncoderConfig {
///     model_path: PathBuf::from("models/climatebert/model.onnx"),
///     tokenizer_path: PathBuf::from("models/climatebert/tokenizer.json"),
///     ..Default::default()
/// };
///
/// let encoder = load_encoder(&cfg).expect("encoder assets present");
/// let vectors = encoder.encode(&["sea levels are rising"]).unwrap();
/// assert_eq!(vectors[0].dim(), encoder.dimension());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EncoderConfig {
    /// Encoder backend: `"onnx"` (local model) or `"stub"` (deterministic
    /// hash-seeded vectors, no model files).
    pub mode: String,
    /// Friendly label used in logs.
    pub model_name: String,
    /// Path to the ONNX export of the encoder.
    pub model_path: PathBuf,
    /// Path to `tokenizer.json`.
    pub tokenizer_path: PathBuf,
    /// Token budget per text; longer inputs are truncated silently.
    pub max_sequence_length: usize,
    /// Width of the produced vectors. Must match what the downstream
    /// classifiers were fit against.
    pub embedding_dim: usize,
    /// Token position whose hidden state represents the whole text
    /// (0 = the leading `<s>`/`[CLS]` token).
    pub representation_index: usize,
    /// Id written into padded positions. RoBERTa vocabularies use 1.
    pub pad_token_id: u32,
    /// ONNX Runtime intra-op thread count.
    pub intra_threads: i16,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            mode: "onnx".into(),
            model_name: "distilroberta-base-climate-f".into(),
            model_path: PathBuf::from("./models/distilroberta-base-climate-f/model.onnx"),
            tokenizer_path: PathBuf::from("./models/distilroberta-base-climate-f/tokenizer.json"),
            max_sequence_length: 128,
            embedding_dim: 768,
            representation_index: 0,
            pad_token_id: 1,
            intra_threads: 1,
        }
    }
}

impl EncoderConfig {
    pub fn validate(&self) -> Result<(), SemanticError> {
        match self.mode.as_str() {
            "onnx" | "stub" => {}
            other => {
                return Err(SemanticError::InvalidConfig(format!(
                    "unknown encoder mode '{other}'"
                )))
            }
        }
        if self.embedding_dim == 0 {
            return Err(SemanticError::InvalidConfig(
                "embedding_dim must be > 0".into(),
            ));
        }
        if self.max_sequence_length == 0 {
            return Err(SemanticError::InvalidConfig(
                "max_sequence_length must be > 0".into(),
            ));
        }
        if self.representation_index >= self.max_sequence_length {
            return Err(SemanticError::InvalidConfig(format!(
                "representation_index {} is outside the {}-token window",
                self.representation_index, self.max_sequence_length
            )));
        }
        if self.intra_threads < 1 {
            return Err(SemanticError::InvalidConfig(
                "intra_threads must be >= 1".into(),
            ));
        }
        Ok(())
    }
}
