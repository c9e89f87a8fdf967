use fxhash::hash64;

use crate::{EmotionClassifier, EmotionConfig, EmotionError, NativeScore};

/// Hash-seeded scores over the configured labels; no model files needed.
/// Scores are positive and sum to one. Same text, same scores.
#[derive(Debug, Clone)]
pub struct StubEmotionClassifier {
    labels: Vec<String>,
}

impl StubEmotionClassifier {
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(cfg: &EmotionConfig) -> Result<Self, EmotionError> {
        cfg.validate()?;
        Ok(Self::new(cfg.labels.iter().cloned()))
    }
}

impl EmotionClassifier for StubEmotionClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    fn score(&self, text: &str) -> Result<Vec<NativeScore>, EmotionError> {
        let seed = hash64(text.as_bytes());
        let raw: Vec<f64> = self
            .labels
            .iter()
            .map(|label| {
                let h = hash64(&(seed, label.as_str()));
                ((h % 1000) + 1) as f64
            })
            .collect();
        let total: f64 = raw.iter().sum();
        Ok(self
            .labels
            .iter()
            .zip(raw)
            .map(|(label, r)| NativeScore::new(label.clone(), r / total))
            .collect())
    }
}
