use serde::{Deserialize, Serialize};

use crate::SemanticError;

/// Dense vector for one input text. Request-scoped; classifiers read it only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    vector: Vec<f32>,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.vector
    }

    pub fn dim(&self) -> usize {
        self.vector.len()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.vector
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.vector
    }
}

/// Maps texts to fixed-width vectors.
///
/// Implementations hold their weights for the process lifetime and take
/// `&self`, so one instance can be shared across threads behind an `Arc`.
pub trait TextEncoder: Send + Sync {
    /// Name used in logs.
    fn model_name(&self) -> &str;

    /// Width of every vector this encoder returns.
    fn dimension(&self) -> usize;

    /// One vector per input, same order. An empty slice yields an empty `Vec`.
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, SemanticError>;
}
