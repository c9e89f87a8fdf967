use semantic::runtime::{ModelOutput, ModelSpec, OnnxModel};
use semantic::SemanticError;

use crate::config::Activation;
use crate::{EmotionClassifier, EmotionConfig, EmotionError, NativeScore};

/// Sequence-classification model run through ONNX Runtime.
///
/// The first model output must be logits shaped `[1, labels.len()]`. `load`
/// runs one warm-up text so a label list that does not fit the model fails
/// at startup.
const WARMUP_TEXT: &str = "the floods scare me";

pub struct OnnxEmotionClassifier {
    model: OnnxModel,
    labels: Vec<String>,
    activation: Activation,
}

impl OnnxEmotionClassifier {
    pub fn load(cfg: &EmotionConfig) -> Result<Self, EmotionError> {
        cfg.validate()?;
        let model = OnnxModel::load(ModelSpec {
            name: &cfg.model_name,
            model_path: &cfg.model_path,
            tokenizer_path: &cfg.tokenizer_path,
            max_sequence_length: cfg.max_sequence_length,
            pad_token_id: cfg.pad_token_id,
            intra_threads: cfg.intra_threads,
        })?;
        verify_warmup(model.forward(&[WARMUP_TEXT]), cfg.labels.len())?;
        tracing::debug!(
            model = model.name(),
            labels = cfg.labels.len(),
            "emotion warm-up passed"
        );
        Ok(Self {
            model,
            labels: cfg.labels.clone(),
            activation: cfg.activation,
        })
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn name(&self) -> &str {
        self.model.name()
    }

    fn score(&self, text: &str) -> Result<Vec<NativeScore>, EmotionError> {
        let output = self.model.forward(&[text])?;
        let logits = single_row(&output, self.labels.len())?;
        let scores = activate(logits, self.activation);
        Ok(self
            .labels
            .iter()
            .zip(scores)
            .map(|(label, score)| NativeScore::new(label.clone(), score))
            .collect())
    }
}

fn single_row(output: &ModelOutput, labels: usize) -> Result<&[f32], EmotionError> {
    let [1, width] = output.shape[..] else {
        return Err(EmotionError::Model(SemanticError::Inference(format!(
            "expected logits shaped [1, {labels}], got {:?}",
            output.shape
        ))));
    };
    if width != labels {
        return Err(EmotionError::LabelCountMismatch {
            expected: labels,
            actual: width,
        });
    }
    output.values.get(..width).ok_or_else(|| {
        EmotionError::Model(SemanticError::Inference(format!(
            "logits hold {} values for {width} labels",
            output.values.len()
        )))
    })
}

/// Shape problems seen while warming up are configuration errors.
fn verify_warmup(
    output: Result<ModelOutput, SemanticError>,
    labels: usize,
) -> Result<(), EmotionError> {
    output
        .map_err(EmotionError::Model)
        .and_then(|output| single_row(&output, labels).map(|_| ()))
        .map_err(|err| match err {
            EmotionError::Model(SemanticError::Inference(msg)) => {
                EmotionError::InvalidConfig(format!("warm-up run failed: {msg}"))
            }
            other => other,
        })
}

pub(crate) fn activate(logits: &[f32], activation: Activation) -> Vec<f64> {
    let logits = logits.iter().map(|&l| f64::from(l));
    match activation {
        Activation::Sigmoid => logits.map(|z| 1.0 / (1.0 + (-z).exp())).collect(),
        Activation::Softmax => {
            let logits: Vec<f64> = logits.collect();
            let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
            let total: f64 = exps.iter().sum();
            exps.into_iter().map(|e| e / total).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn softmax_sums_to_one() {
        let scores = activate(&[1.0, 2.0, 3.0], Activation::Softmax);
        assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(scores[2] > scores[1] && scores[1] > scores[0]);
    }

    #[test]
    fn sigmoid_is_independent() {
        let scores = activate(&[0.0, 0.0], Activation::Sigmoid);
        assert_eq!(scores, vec![0.5, 0.5]);
    }

    #[test]
    fn row_shape_checked() {
        let output = ModelOutput {
            shape: vec![1, 3],
            values: vec![0.1, 0.2, 0.3],
        };
        assert_eq!(single_row(&output, 3).unwrap(), &[0.1, 0.2, 0.3]);
        assert!(matches!(
            single_row(&output, 7),
            Err(EmotionError::LabelCountMismatch {
                expected: 7,
                actual: 3
            })
        ));

        let hidden_states = ModelOutput {
            shape: vec![1, 4, 3],
            values: vec![0.0; 12],
        };
        assert!(single_row(&hidden_states, 3).is_err());
    }

    #[test]
    fn warmup_rejects_label_list_that_does_not_fit_model() {
        let six_logits = ModelOutput {
            shape: vec![1, 6],
            values: vec![0.0; 6],
        };
        let err = verify_warmup(Ok(six_logits), 7).unwrap_err();
        assert!(matches!(
            err,
            EmotionError::LabelCountMismatch {
                expected: 7,
                actual: 6
            }
        ));
        assert!(err.is_configuration());
    }

    #[test]
    fn warmup_failures_are_configuration_errors() {
        let hidden_states = ModelOutput {
            shape: vec![1, 4, 7],
            values: vec![0.0; 28],
        };
        let err = verify_warmup(Ok(hidden_states), 7).unwrap_err();
        assert!(matches!(err, EmotionError::InvalidConfig(_)));

        let err = verify_warmup(Err(SemanticError::Inference("ort".into())), 7).unwrap_err();
        assert!(err.is_configuration());

        let logits = ModelOutput {
            shape: vec![1, 7],
            values: vec![0.0; 7],
        };
        assert!(verify_warmup(Ok(logits), 7).is_ok());
    }

    #[test]
    fn missing_model_is_configuration_error() {
        let cfg = EmotionConfig {
            model_path: PathBuf::from("./missing/emotion.onnx"),
            ..Default::default()
        };
        let err = OnnxEmotionClassifier::load(&cfg).err().unwrap();
        assert!(err.is_configuration());
    }
}
