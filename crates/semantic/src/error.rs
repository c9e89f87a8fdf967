use std::io;
use thiserror::Error;

/// Errors surfaced while loading or running a text encoder.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// The ONNX model file does not exist.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The tokenizer JSON does not exist.
    #[error("tokenizer missing: {0}")]
    TokenizerMissing(String),
    /// Configuration is inconsistent (unknown mode, zero dimension, ...).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// The model produced vectors of a different width than configured.
    #[error("embedding dimension mismatch: expected {expected}, model produced {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Low-level IO failures while touching the filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// ONNX Runtime or tokenizer errors during a forward run.
    #[error("inference failure: {0}")]
    Inference(String),
}

impl SemanticError {
    /// `true` for errors that mean the encoder cannot serve at all, as opposed
    /// to a single failed forward run.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, SemanticError::Inference(_))
    }
}
