use std::sync::Arc;

use crate::{aggregate, Emotion, EmotionClassifier, EmotionError, EmotionMap, EmotionTotals};

/// Dominant target emotion for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionDetection {
    pub emotion: Emotion,
    /// Aggregated total of `emotion`; may exceed 1.
    pub confidence: f64,
    pub totals: EmotionTotals,
}

/// Runs an [`EmotionClassifier`] and folds its output onto the taxonomy.
#[derive(Clone)]
pub struct EmotionAggregator {
    classifier: Arc<dyn EmotionClassifier>,
    map: EmotionMap,
}

impl EmotionAggregator {
    pub fn new(classifier: Arc<dyn EmotionClassifier>, map: EmotionMap) -> Self {
        Self { classifier, map }
    }

    pub fn map(&self) -> &EmotionMap {
        &self.map
    }

    /// Scores `text` as given. Callers pass raw text: punctuation and casing
    /// carry emotion cues that cleaning would remove.
    pub fn detect(&self, text: &str) -> Result<EmotionDetection, EmotionError> {
        let scores = self.classifier.score(text)?;
        let totals = aggregate(&scores, &self.map)?;
        let (emotion, confidence) = totals.dominant();
        tracing::debug!(
            classifier = self.classifier.name(),
            native_labels = scores.len(),
            %emotion,
            confidence,
            "emotion detected"
        );
        Ok(EmotionDetection {
            emotion,
            confidence,
            totals,
        })
    }
}

impl std::fmt::Debug for EmotionAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmotionAggregator")
            .field("classifier", &self.classifier.name())
            .field("map", &self.map)
            .finish()
    }
}
