use fxhash::hash64;

use crate::types::{Embedding, TextEncoder};
use crate::{EncoderConfig, SemanticError};

/// Deterministic encoder for tests and model-free dry runs. Generates
/// sinusoid values derived from a hash of the input text, so identical text
/// always maps to an identical vector.
#[derive(Debug, Clone)]
pub struct StubEncoder {
    model_name: String,
    dimension: usize,
}

impl StubEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            model_name: "stub".into(),
            dimension,
        }
    }

    pub fn from_config(cfg: &EncoderConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;
        Ok(Self {
            model_name: cfg.model_name.clone(),
            dimension: cfg.embedding_dim,
        })
    }

    fn embed(&self, text: &str) -> Embedding {
        let h = hash64(text.as_bytes());
        let vector = (0..self.dimension)
            .map(|idx| ((h >> (idx % 32)) as f32 * 0.0001).sin())
            .collect();
        Embedding::new(vector)
    }
}

impl TextEncoder for StubEncoder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, SemanticError> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }
}
