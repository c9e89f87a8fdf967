use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::ClassifierError;
use crate::forest::RandomForest;
use crate::logistic::LogisticRegression;

/// A fitted classifier that maps a fixed-width vector to a class value and
/// to a distribution over its classes.
///
/// `predict` and `predict_proba` are separate computations; callers compare
/// their results rather than deriving one from the other.
pub trait ProbabilisticClassifier: Send + Sync {
    /// Feature width the classifier was fit on.
    fn input_width(&self) -> usize;

    /// Class values in the order `predict_proba` reports them.
    fn classes(&self) -> &[usize];

    fn predict(&self, features: &[f32]) -> Result<usize, ClassifierError>;

    fn predict_proba(&self, features: &[f32]) -> Result<Vec<f64>, ClassifierError>;
}

/// Serialized classifier as written by the training export script.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    Logistic(LogisticRegression),
    RandomForest(RandomForest),
}

impl ClassifierArtifact {
    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierArtifact::Logistic(_) => "logistic",
            ClassifierArtifact::RandomForest(_) => "random_forest",
        }
    }

    /// Validates the artifact and hands back a shareable classifier.
    pub fn into_classifier(self) -> Result<Arc<dyn ProbabilisticClassifier>, ClassifierError> {
        let model: Arc<dyn ProbabilisticClassifier> = match self {
            ClassifierArtifact::Logistic(m) => Arc::new(m.validated()?),
            ClassifierArtifact::RandomForest(m) => Arc::new(m.validated()?),
        };
        Ok(model)
    }
}

/// Reads and validates a classifier artifact from disk.
pub fn load_classifier(
    path: impl AsRef<Path>,
) -> Result<Arc<dyn ProbabilisticClassifier>, ClassifierError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ClassifierError::ArtifactNotFound(path.display().to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    let artifact = ClassifierArtifact::from_json(&raw)?;
    let kind = artifact.kind();
    let model = artifact.into_classifier()?;
    tracing::info!(
        path = %path.display(),
        kind,
        input_width = model.input_width(),
        classes = model.classes().len(),
        "classifier loaded"
    );
    Ok(model)
}

pub(crate) fn check_width(expected: usize, features: &[f32]) -> Result<(), ClassifierError> {
    if features.len() != expected {
        return Err(ClassifierError::DimensionMismatch {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

/// Position and value of the first maximum. `None` for an empty slice or one
/// containing NaN.
pub(crate) fn argmax(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        if v.is_nan() {
            return None;
        }
        match best {
            Some((_, top)) if v <= top => {}
            _ => best = Some((idx, v)),
        }
    }
    best
}
