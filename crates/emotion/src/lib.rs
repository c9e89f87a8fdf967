//! Emotion stage of the climasense pipeline.
//!
//! A pretrained emotion classifier scores text in its own label vocabulary
//! (`anger`, `joy`, `surprise`, ...). [`EmotionAggregator`] folds those scores
//! onto the fixed five-emotion taxonomy through an [`EmotionMap`] and reports
//! the dominant [`Emotion`] with its summed score.
//!
//! ```
//! use emotion::{aggregate, Emotion, EmotionMap, NativeScore};
//!
//! let scores = vec![
//!     NativeScore::new("joy", 0.30),
//!     NativeScore::new("neutral", 0.25),
//!     NativeScore::new("surprise", 0.20),
//!     NativeScore::new("fear", 0.25),
//! ];
//! let totals = aggregate(&scores, &EmotionMap::default()).unwrap();
//! let (emotion, confidence) = totals.dominant();
//! assert_eq!(emotion, Emotion::Trust);
//! assert!((confidence - 0.45).abs() < 1e-9);
//! ```

mod aggregate;
mod aggregator;
mod classifier;
mod config;
mod error;
mod map;
mod onnx;
mod stub;
mod taxonomy;

pub use crate::aggregate::{aggregate, EmotionTotals, NativeScore};
pub use crate::aggregator::{EmotionAggregator, EmotionDetection};
pub use crate::classifier::EmotionClassifier;
pub use crate::config::{Activation, EmotionConfig};
pub use crate::error::EmotionError;
pub use crate::map::{EmotionMap, DEFAULT_EMOTION_MAP};
pub use crate::onnx::OnnxEmotionClassifier;
pub use crate::stub::StubEmotionClassifier;
pub use crate::taxonomy::Emotion;

use std::sync::Arc;

/// Builds the classifier selected by `cfg.mode`.
pub fn load_emotion_classifier(
    cfg: &EmotionConfig,
) -> Result<Arc<dyn EmotionClassifier>, EmotionError> {
    cfg.validate()?;
    let classifier: Arc<dyn EmotionClassifier> = match cfg.mode.as_str() {
        "stub" => {
            tracing::warn!("using stub emotion classifier; scores carry no meaning");
            Arc::new(StubEmotionClassifier::from_config(cfg)?)
        }
        _ => Arc::new(OnnxEmotionClassifier::load(cfg)?),
    };
    Ok(classifier)
}

impl EmotionAggregator {
    /// Loads the configured classifier and map.
    pub fn from_config(cfg: &EmotionConfig) -> Result<Self, EmotionError> {
        let classifier = load_emotion_classifier(cfg)?;
        Ok(Self::new(classifier, cfg.emotion_map()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_mode_runs_end_to_end() {
        let cfg = EmotionConfig {
            mode: "stub".into(),
            ..Default::default()
        };
        let aggregator = EmotionAggregator::from_config(&cfg).unwrap();
        let first = aggregator.detect("Wildfires everywhere!!").unwrap();
        let second = aggregator.detect("Wildfires everywhere!!").unwrap();
        assert_eq!(first, second);
        assert!((first.totals.sum() - 1.0).abs() < 1e-9);
        assert_eq!(first.confidence, first.totals.get(first.emotion));
    }

    #[test]
    fn onnx_mode_needs_model_files() {
        let cfg = EmotionConfig {
            model_path: "./missing/model.onnx".into(),
            ..Default::default()
        };
        let err = load_emotion_classifier(&cfg).err().unwrap();
        assert!(matches!(err, EmotionError::Model(_)));
    }
}
