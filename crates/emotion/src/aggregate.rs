use serde::Serialize;

use crate::{Emotion, EmotionError, EmotionMap};

/// One score from the emotion classifier, in its own label space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeScore {
    pub label: String,
    pub score: f64,
}

impl NativeScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Aggregated mass per target emotion. Every emotion is present, zero when
/// nothing mapped onto it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmotionTotals {
    totals: [f64; 5],
}

impl EmotionTotals {
    pub fn get(&self, emotion: Emotion) -> f64 {
        self.totals[emotion.index()]
    }

    /// `(emotion, total)` in taxonomy order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.into_iter().zip(self.totals.iter().copied())
    }

    pub fn sum(&self) -> f64 {
        self.totals.iter().sum()
    }

    /// Emotion with the largest total and that total, unnormalized. Equal
    /// totals go to the emotion listed first in [`Emotion::ALL`].
    pub fn dominant(&self) -> (Emotion, f64) {
        let mut best = (Emotion::ALL[0], self.totals[0]);
        for (emotion, total) in self.iter().skip(1) {
            if total > best.1 {
                best = (emotion, total);
            }
        }
        best
    }
}

/// Folds native scores into the target taxonomy.
///
/// Scores whose label the map does not know are dropped. Negative or
/// non-finite scores are rejected rather than summed.
pub fn aggregate(scores: &[NativeScore], map: &EmotionMap) -> Result<EmotionTotals, EmotionError> {
    let mut totals = EmotionTotals::default();
    for NativeScore { label, score } in scores {
        if !score.is_finite() || *score < 0.0 {
            return Err(EmotionError::InvalidScore {
                label: label.clone(),
                score: *score,
            });
        }
        match map.get(label) {
            Some(emotion) => totals.totals[emotion.index()] += score,
            None => tracing::trace!(label = %label, "unmapped emotion label dropped"),
        }
    }
    Ok(totals)
}
