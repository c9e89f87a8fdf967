use crate::runtime::{ModelOutput, ModelSpec, OnnxModel};
use crate::types::{Embedding, TextEncoder};
use crate::{EncoderConfig, SemanticError};

const WARMUP_TEXT: &str = "global temperatures are rising";

/// Transformer encoder exported to ONNX. The hidden state at
/// `representation_index` is the sentence vector; no mean pooling.
pub struct OnnxEncoder {
    model: OnnxModel,
    dimension: usize,
    representation_index: usize,
}

impl OnnxEncoder {
    /// Loads tokenizer and weights, then runs one warm-up text to confirm the
    /// model's hidden width matches `embedding_dim`. Any failure here means the
    /// encoder cannot serve.
    pub fn load(cfg: &EncoderConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;
        let model = OnnxModel::load(ModelSpec {
            name: &cfg.model_name,
            model_path: &cfg.model_path,
            tokenizer_path: &cfg.tokenizer_path,
            max_sequence_length: cfg.max_sequence_length,
            pad_token_id: cfg.pad_token_id,
            intra_threads: cfg.intra_threads,
        })?;
        verify_warmup(
            model.forward(&[WARMUP_TEXT]),
            cfg.representation_index,
            cfg.embedding_dim,
        )?;
        tracing::debug!(
            model = model.name(),
            dim = cfg.embedding_dim,
            "encoder warm-up passed"
        );
        Ok(Self {
            model,
            dimension: cfg.embedding_dim,
            representation_index: cfg.representation_index,
        })
    }
}

impl TextEncoder for OnnxEncoder {
    fn model_name(&self) -> &str {
        self.model.name()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, SemanticError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let output = self.model.forward(texts)?;
        select_representation(output, texts.len(), self.representation_index, self.dimension)
    }
}

/// Validates the warm-up run. At load time a bad output shape is a
/// configuration problem, so per-request `Inference` errors are promoted.
pub(crate) fn verify_warmup(
    output: Result<ModelOutput, SemanticError>,
    index: usize,
    expected_dim: usize,
) -> Result<(), SemanticError> {
    output
        .and_then(|output| select_representation(output, 1, index, expected_dim))
        .map(|_| ())
        .map_err(|err| match err {
            SemanticError::Inference(msg) => {
                SemanticError::InvalidConfig(format!("warm-up run failed: {msg}"))
            }
            other => other,
        })
}

/// Picks `hidden[b, index, :]` for every batch row of a `[batch, seq, hidden]` output.
pub(crate) fn select_representation(
    output: ModelOutput,
    expected_batch: usize,
    index: usize,
    expected_dim: usize,
) -> Result<Vec<Embedding>, SemanticError> {
    let [batch, seq_len, hidden] = output.shape[..] else {
        return Err(SemanticError::Inference(format!(
            "expected a [batch, seq, hidden] output, got shape {:?}",
            output.shape
        )));
    };
    if batch != expected_batch {
        return Err(SemanticError::Inference(format!(
            "model returned {batch} rows for {expected_batch} inputs"
        )));
    }
    if hidden != expected_dim {
        return Err(SemanticError::DimensionMismatch {
            expected: expected_dim,
            actual: hidden,
        });
    }
    if index >= seq_len {
        return Err(SemanticError::Inference(format!(
            "representation index {index} outside sequence of {seq_len} tokens"
        )));
    }
    if output.values.len() != batch * seq_len * hidden {
        return Err(SemanticError::Inference(format!(
            "output holds {} values, shape {:?} needs {}",
            output.values.len(),
            output.shape,
            batch * seq_len * hidden
        )));
    }

    Ok((0..batch)
        .map(|row| {
            let start = (row * seq_len + index) * hidden;
            Embedding::new(output.values[start..start + hidden].to_vec())
        })
        .collect())
}
