use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::ClassifierError;
use crate::labels::ClassLabel;
use crate::model::{argmax, ProbabilisticClassifier};

/// Outcome of one classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction<L> {
    pub label: L,
    /// Maximum entry of `probabilities`.
    pub confidence: f64,
    /// Distribution in the classifier's class order.
    pub probabilities: Vec<f64>,
}

/// Binds a [`ProbabilisticClassifier`] to a closed label set.
///
/// Construction checks the wiring once: the classifier must report exactly as
/// many classes as `L` has labels, and every class value must be a valid
/// position in `L::ALL`. Per-call work then only has to check the input.
pub struct ClassifierAdapter<L: ClassLabel> {
    model: Arc<dyn ProbabilisticClassifier>,
    _labels: PhantomData<L>,
}

impl<L: ClassLabel> ClassifierAdapter<L> {
    pub fn new(model: Arc<dyn ProbabilisticClassifier>) -> Result<Self, ClassifierError> {
        let len = L::ALL.len();
        let classes = model.classes();
        if classes.len() != len {
            return Err(ClassifierError::ClassCountMismatch {
                model: classes.len(),
                labels: len,
            });
        }
        if let Some(&value) = classes.iter().find(|&&c| c >= len) {
            return Err(ClassifierError::ClassOutOfRange { value, len });
        }
        Ok(Self {
            model,
            _labels: PhantomData,
        })
    }

    pub fn input_width(&self) -> usize {
        self.model.input_width()
    }

    /// Classifies one vector.
    ///
    /// The class returned by `predict` must hold a maximal entry of
    /// `predict_proba`. A predicted class whose probability is strictly below
    /// the maximum means the label order or the classifier itself is broken
    /// and is reported as [`ClassifierError::InconsistentPrediction`].
    pub fn classify(&self, features: &[f32]) -> Result<Prediction<L>, ClassifierError> {
        let expected = self.model.input_width();
        if features.len() != expected {
            return Err(ClassifierError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }

        let predicted = self.model.predict(features)?;
        let probabilities = self.model.predict_proba(features)?;

        let classes = self.model.classes();
        if probabilities.len() != classes.len() {
            return Err(ClassifierError::ClassCountMismatch {
                model: probabilities.len(),
                labels: classes.len(),
            });
        }
        if probabilities
            .iter()
            .any(|p| !p.is_finite() || *p < 0.0 || *p > 1.0 + 1e-9)
        {
            return Err(ClassifierError::Inference(format!(
                "probabilities outside [0, 1]: {probabilities:?}"
            )));
        }
        let Some((top, confidence)) = argmax(&probabilities) else {
            return Err(ClassifierError::Inference("empty probability vector".into()));
        };

        // Near the decision boundary the distribution can round to an exact
        // tie while `predict` still picks a side; any maximal column agrees.
        let predicted_column = classes.iter().position(|&c| c == predicted);
        match predicted_column {
            Some(col) if probabilities[col] >= confidence => {}
            _ => {
                return Err(ClassifierError::InconsistentPrediction {
                    predicted,
                    argmax: classes[top],
                });
            }
        }
        let label = L::from_index(predicted).ok_or(ClassifierError::ClassOutOfRange {
            value: predicted,
            len: L::ALL.len(),
        })?;

        Ok(Prediction {
            label,
            confidence,
            probabilities,
        })
    }
}

impl<L: ClassLabel> Clone for ClassifierAdapter<L> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            _labels: PhantomData,
        }
    }
}

impl<L: ClassLabel> fmt::Debug for ClassifierAdapter<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("labels", &L::ALL)
            .field("input_width", &self.model.input_width())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{Misinformation, Sentiment};
    use crate::logistic::LogisticRegression;

    /// Returns canned answers so each consistency rule can be hit directly.
    struct Scripted {
        width: usize,
        classes: Vec<usize>,
        predicted: usize,
        proba: Vec<f64>,
    }

    impl ProbabilisticClassifier for Scripted {
        fn input_width(&self) -> usize {
            self.width
        }
        fn classes(&self) -> &[usize] {
            &self.classes
        }
        fn predict(&self, _: &[f32]) -> Result<usize, ClassifierError> {
            Ok(self.predicted)
        }
        fn predict_proba(&self, _: &[f32]) -> Result<Vec<f64>, ClassifierError> {
            Ok(self.proba.clone())
        }
    }

    fn scripted(predicted: usize, proba: Vec<f64>) -> Arc<dyn ProbabilisticClassifier> {
        Arc::new(Scripted {
            width: 4,
            classes: (0..proba.len()).collect(),
            predicted,
            proba,
        })
    }

    #[test]
    fn confidence_is_max_probability() {
        let adapter =
            ClassifierAdapter::<Sentiment>::new(scripted(2, vec![0.1, 0.2, 0.7])).unwrap();
        let out = adapter.classify(&[0.0; 4]).unwrap();
        assert_eq!(out.label, Sentiment::Positive);
        assert!((out.confidence - 0.7).abs() < 1e-12);
    }

    #[test]
    fn tie_resolves_to_first_class() {
        let adapter =
            ClassifierAdapter::<Misinformation>::new(scripted(0, vec![0.5, 0.5])).unwrap();
        let out = adapter.classify(&[0.0; 4]).unwrap();
        assert_eq!(out.label, Misinformation::Scientific);
        assert_eq!(out.confidence, 0.5);
    }

    #[test]
    fn disagreement_is_reported() {
        let adapter =
            ClassifierAdapter::<Sentiment>::new(scripted(0, vec![0.1, 0.2, 0.7])).unwrap();
        let err = adapter.classify(&[0.0; 4]).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::InconsistentPrediction {
                predicted: 0,
                argmax: 2
            }
        ));
        assert!(err.is_configuration());
    }

    #[test]
    fn predicted_class_on_tied_maximum_is_accepted() {
        let adapter =
            ClassifierAdapter::<Misinformation>::new(scripted(1, vec![0.5, 0.5])).unwrap();
        let out = adapter.classify(&[0.0; 4]).unwrap();
        assert_eq!(out.label, Misinformation::Misinformation);
        assert_eq!(out.confidence, 0.5);
    }

    #[test]
    fn decision_value_rounding_to_even_odds_is_not_a_mismatch() {
        // sigmoid(1e-17) is exactly 0.5 in f64, yet the decision value is positive.
        let model = LogisticRegression {
            coef: vec![vec![1.0]],
            intercept: vec![0.0],
            classes: Vec::new(),
        }
        .validated()
        .unwrap();
        let adapter = ClassifierAdapter::<Misinformation>::new(Arc::new(model)).unwrap();
        let out = adapter.classify(&[1e-17]).unwrap();
        assert_eq!(out.label, Misinformation::Misinformation);
        assert_eq!(out.probabilities, vec![0.5, 0.5]);
        assert_eq!(out.confidence, 0.5);
    }

    #[test]
    fn wrong_class_count_rejected_at_construction() {
        let err = ClassifierAdapter::<Sentiment>::new(scripted(0, vec![0.5, 0.5])).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::ClassCountMismatch { model: 2, labels: 3 }
        ));
    }

    #[test]
    fn out_of_range_class_value_rejected() {
        let model = Arc::new(Scripted {
            width: 4,
            classes: vec![0, 5],
            predicted: 0,
            proba: vec![0.5, 0.5],
        });
        let err = ClassifierAdapter::<Misinformation>::new(model).unwrap_err();
        assert!(matches!(err, ClassifierError::ClassOutOfRange { value: 5, len: 2 }));
    }

    #[test]
    fn non_finite_probability_is_inference_failure() {
        let adapter =
            ClassifierAdapter::<Misinformation>::new(scripted(0, vec![f64::NAN, 0.5])).unwrap();
        let err = adapter.classify(&[0.0; 4]).unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
        assert!(!err.is_configuration());
    }

    #[test]
    fn width_checked_before_model_runs() {
        let adapter =
            ClassifierAdapter::<Sentiment>::new(scripted(2, vec![0.1, 0.2, 0.7])).unwrap();
        let err = adapter.classify(&[0.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::DimensionMismatch { expected: 4, actual: 3 }
        ));
    }

    #[test]
    fn permuted_class_values_map_through_labels() {
        // Class values listed in reverse: proba[0] belongs to class 2.
        let model = LogisticRegression {
            coef: vec![vec![1.0], vec![0.0], vec![-1.0]],
            intercept: vec![0.0, 0.0, 0.0],
            classes: vec![2, 1, 0],
        }
        .validated()
        .unwrap();
        let adapter = ClassifierAdapter::<Sentiment>::new(Arc::new(model)).unwrap();
        let out = adapter.classify(&[5.0]).unwrap();
        assert_eq!(out.label, Sentiment::Positive);
        let out = adapter.classify(&[-5.0]).unwrap();
        assert_eq!(out.label, Sentiment::Negative);
    }
}
