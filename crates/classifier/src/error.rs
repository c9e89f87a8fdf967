use std::io;
use thiserror::Error;

/// Errors surfaced while loading a classifier or classifying a vector.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The artifact file does not exist.
    #[error("classifier artifact not found: {0}")]
    ArtifactNotFound(String),
    /// Low-level IO failures while reading the artifact.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The artifact is not valid JSON for any known classifier kind.
    #[error("malformed classifier artifact: {0}")]
    Parse(#[from] serde_json::Error),
    /// The artifact parsed but is structurally unusable.
    #[error("invalid classifier artifact: {0}")]
    InvalidArtifact(String),
    /// The feature vector width differs from what the classifier was fit on.
    #[error("feature width mismatch: classifier expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// The classifier's class count differs from the adapter's label set.
    #[error("classifier has {model} classes but the label set has {labels}")]
    ClassCountMismatch { model: usize, labels: usize },
    /// A class value cannot be used as a position in the label set.
    #[error("class value {value} has no label (label set size {len})")]
    ClassOutOfRange { value: usize, len: usize },
    /// The predicted class and the argmax of the distribution disagree.
    #[error("predicted class {predicted} disagrees with probability argmax class {argmax}")]
    InconsistentPrediction { predicted: usize, argmax: usize },
    /// The classifier produced an unusable result for this input.
    #[error("inference failure: {0}")]
    Inference(String),
}

impl ClassifierError {
    /// `true` when the classifier and its surroundings are wired up wrong and
    /// no request can be served correctly; `false` for a single bad run.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, ClassifierError::Inference(_))
    }
}
