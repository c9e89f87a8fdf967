//! Shared ONNX Runtime handle: one tokenizer plus one session, loaded once.

use once_cell::sync::OnceCell;
use onnxruntime::environment::Environment;
use onnxruntime::ndarray::{Array, Array2};
use onnxruntime::GraphOptimizationLevel;
use std::path::Path;
use std::sync::Mutex;
use tokenizers::{Tokenizer, TruncationParams};

use crate::SemanticError;

static ORT_ENV: OnceCell<Environment> = OnceCell::new();

/// Where to find a model and how to feed it.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec<'a> {
    pub name: &'a str,
    pub model_path: &'a Path,
    pub tokenizer_path: &'a Path,
    pub max_sequence_length: usize,
    pub pad_token_id: u32,
    pub intra_threads: i16,
}

/// Raw first output of a forward run, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
}

/// A tokenizer and an ONNX session, resident for the process lifetime.
///
/// ORT sessions need exclusive access per run, so the session sits behind a
/// mutex. Everything else is read-only after [`OnnxModel::load`].
pub struct OnnxModel {
    name: String,
    tokenizer: Tokenizer,
    session: Mutex<OrtSession>,
    pad_token_id: u32,
}

mod session {
    use onnxruntime::session::Session;

    /// Owns the one ORT session of an [`OnnxModel`](super::OnnxModel).
    ///
    /// ONNX Runtime documents `OrtSession` as not bound to its creating
    /// thread, and `OrtApi::Run` may be called concurrently on one session.
    /// The binding keeps raw pointers and so is not `Send`. This wrapper is
    /// the only place the crate asserts otherwise, and it is reachable only
    /// through `&mut`, which `OnnxModel` hands out behind its mutex.
    pub(super) struct OrtSession(Session<'static>);

    // SAFETY: ORT sessions may move between threads; every `run` goes through
    // `get_mut`, which needs the exclusive borrow held by the mutex guard.
    unsafe impl Send for OrtSession {}

    impl OrtSession {
        pub(super) fn new(session: Session<'static>) -> Self {
            Self(session)
        }

        pub(super) fn get_mut(&mut self) -> &mut Session<'static> {
            &mut self.0
        }
    }
}

use session::OrtSession;

impl OnnxModel {
    pub fn load(spec: ModelSpec<'_>) -> Result<Self, SemanticError> {
        if !spec.model_path.exists() {
            return Err(SemanticError::ModelNotFound(
                spec.model_path.display().to_string(),
            ));
        }
        if !spec.tokenizer_path.exists() {
            return Err(SemanticError::TokenizerMissing(
                spec.tokenizer_path.display().to_string(),
            ));
        }

        let mut tokenizer = Tokenizer::from_file(spec.tokenizer_path).map_err(|e| {
            SemanticError::InvalidConfig(format!(
                "failed to load tokenizer {}: {e}",
                spec.tokenizer_path.display()
            ))
        })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: spec.max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| SemanticError::InvalidConfig(e.to_string()))?;
        // Padding is applied per batch in `build_padded_arrays`.
        tokenizer.with_padding(None);

        let session = ort_environment()?
            .new_session_builder()
            .map_err(|e| SemanticError::InvalidConfig(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Basic)
            .map_err(|e| SemanticError::InvalidConfig(e.to_string()))?
            .with_number_threads(spec.intra_threads)
            .map_err(|e| SemanticError::InvalidConfig(e.to_string()))?
            .with_model_from_file(spec.model_path.to_path_buf())
            .map_err(|e| {
                SemanticError::InvalidConfig(format!(
                    "failed to load model {}: {e}",
                    spec.model_path.display()
                ))
            })?;

        tracing::info!(
            model = spec.name,
            path = %spec.model_path.display(),
            inputs = session.inputs.len(),
            outputs = session.outputs.len(),
            "onnx model loaded"
        );

        Ok(Self {
            name: spec.name.to_string(),
            tokenizer,
            session: Mutex::new(OrtSession::new(session)),
            pad_token_id: spec.pad_token_id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tokenizes `texts` as one padded batch and runs a single forward pass.
    pub fn forward(&self, texts: &[&str]) -> Result<ModelOutput, SemanticError> {
        let encoded = encode_documents(&self.tokenizer, texts)?;
        let (input_ids, attn_mask) = build_padded_arrays(encoded, self.pad_token_id)?;
        self.execute(input_ids, attn_mask)
    }

    fn execute(
        &self,
        input_ids: Array2<i64>,
        attn_mask: Array2<i64>,
    ) -> Result<ModelOutput, SemanticError> {
        let (batch, seq_len) = input_ids.dim();
        let mut guard = self
            .session
            .lock()
            .map_err(|_| SemanticError::Inference("session lock poisoned".into()))?;
        let session = guard.get_mut();

        let mut runtime_inputs = Vec::with_capacity(session.inputs.len());
        let mut input_ids_tensor = Some(input_ids);
        let mut attn_mask_tensor = Some(attn_mask);

        for input in &session.inputs {
            match input.name.as_str() {
                "input_ids" => {
                    let tensor = input_ids_tensor.take().ok_or_else(|| {
                        SemanticError::InvalidConfig(
                            "model requested `input_ids` multiple times".into(),
                        )
                    })?;
                    runtime_inputs.push(tensor.into_dyn());
                }
                "attention_mask" => {
                    let tensor = attn_mask_tensor.take().ok_or_else(|| {
                        SemanticError::InvalidConfig(
                            "model requested `attention_mask` multiple times".into(),
                        )
                    })?;
                    runtime_inputs.push(tensor.into_dyn());
                }
                "token_type_ids" => {
                    runtime_inputs.push(Array::from_elem((batch, seq_len), 0_i64).into_dyn());
                }
                other => {
                    return Err(SemanticError::InvalidConfig(format!(
                        "unsupported model input '{other}'"
                    )))
                }
            }
        }

        if runtime_inputs.is_empty() {
            return Err(SemanticError::InvalidConfig(
                "model did not declare any inputs".into(),
            ));
        }

        let outputs = session
            .run::<i64, f32, _>(runtime_inputs)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;
        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| SemanticError::Inference("model returned no outputs".into()))?;

        Ok(ModelOutput {
            shape: output_tensor.shape().to_vec(),
            values: output_tensor.iter().copied().collect(),
        })
    }
}

struct EncodedDoc {
    ids: Vec<i64>,
    mask: Vec<i64>,
}

fn encode_documents(
    tokenizer: &Tokenizer,
    texts: &[&str],
) -> Result<Vec<EncodedDoc>, SemanticError> {
    texts
        .iter()
        .map(|text| {
            let encoding = tokenizer
                .encode(*text, true)
                .map_err(|e| SemanticError::Inference(e.to_string()))?;
            Ok(EncodedDoc {
                ids: encoding.get_ids().iter().map(|&x| x as i64).collect(),
                mask: encoding
                    .get_attention_mask()
                    .iter()
                    .map(|&x| x as i64)
                    .collect(),
            })
        })
        .collect()
}

fn build_padded_arrays(
    encoded: Vec<EncodedDoc>,
    pad_token_id: u32,
) -> Result<(Array2<i64>, Array2<i64>), SemanticError> {
    let seq_len = encoded.iter().map(|d| d.ids.len()).max().unwrap_or(0).max(1);
    let batch = encoded.len();
    let mut id_storage = Vec::with_capacity(batch * seq_len);
    let mut mask_storage = Vec::with_capacity(batch * seq_len);

    for EncodedDoc { ids, mask } in encoded {
        if ids.len() != mask.len() {
            return Err(SemanticError::Inference(
                "tokenizer produced mismatched id/mask lengths".into(),
            ));
        }
        let pad = seq_len - ids.len();
        id_storage.extend(ids);
        mask_storage.extend(mask);
        id_storage.extend(std::iter::repeat_n(i64::from(pad_token_id), pad));
        mask_storage.extend(std::iter::repeat_n(0, pad));
    }

    let input_ids = Array::from_shape_vec((batch, seq_len), id_storage)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    let attn_mask = Array::from_shape_vec((batch, seq_len), mask_storage)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    Ok((input_ids, attn_mask))
}

fn ort_environment() -> Result<&'static Environment, SemanticError> {
    ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("climasense")
            .build()
            .map_err(|e| SemanticError::InvalidConfig(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn model_handle_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OnnxModel>();
    }

    #[test]
    fn padded_arrays_pad_ids_and_zero_mask() {
        let docs = vec![
            EncodedDoc {
                ids: vec![0, 10, 2],
                mask: vec![1, 1, 1],
            },
            EncodedDoc {
                ids: vec![0, 2],
                mask: vec![1, 1],
            },
        ];
        let (ids, mask) = build_padded_arrays(docs, 1).unwrap();
        assert_eq!(ids.dim(), (2, 3));
        assert_eq!(ids.row(1).to_vec(), vec![0, 2, 1]);
        assert_eq!(mask.row(1).to_vec(), vec![1, 1, 0]);
        assert_eq!(mask.row(0).to_vec(), vec![1, 1, 1]);
    }

    #[test]
    fn padded_arrays_reject_mismatched_lengths() {
        let docs = vec![EncodedDoc {
            ids: vec![0, 1],
            mask: vec![1],
        }];
        assert!(matches!(
            build_padded_arrays(docs, 1),
            Err(SemanticError::Inference(_))
        ));
    }

    #[test]
    fn load_reports_missing_model() {
        let model = PathBuf::from("./missing/model.onnx");
        let tokenizer = PathBuf::from("./missing/tokenizer.json");
        let err = OnnxModel::load(ModelSpec {
            name: "missing",
            model_path: &model,
            tokenizer_path: &tokenizer,
            max_sequence_length: 16,
            pad_token_id: 1,
            intra_threads: 1,
        })
        .err()
        .expect("missing model must fail");
        assert!(matches!(err, SemanticError::ModelNotFound(_)));
    }
}
