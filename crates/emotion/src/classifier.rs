use crate::{EmotionError, NativeScore};

/// A text classifier that scores every label in its own emotion vocabulary.
pub trait EmotionClassifier: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// One score per native label for `text`.
    fn score(&self, text: &str) -> Result<Vec<NativeScore>, EmotionError>;
}
