use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::model::{argmax, check_width, ProbabilisticClassifier};

/// Linear classifier exported from a fitted logistic regression.
///
/// `coef` is `k x D` for `k > 2` classes (softmax over the `k` decision
/// values) or `1 x D` for the binary case (sigmoid on the single decision
/// value, positive side is `classes[1]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogisticRegression {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub classes: Vec<usize>,
}

impl LogisticRegression {
    /// Checks shapes and fills in `classes` when the artifact omitted them.
    pub fn validated(mut self) -> Result<Self, ClassifierError> {
        let Some(first) = self.coef.first() else {
            return Err(ClassifierError::InvalidArtifact(
                "logistic: coef has no rows".into(),
            ));
        };
        let width = first.len();
        if width == 0 {
            return Err(ClassifierError::InvalidArtifact(
                "logistic: coef rows are empty".into(),
            ));
        }
        if self.coef.iter().any(|row| row.len() != width) {
            return Err(ClassifierError::InvalidArtifact(
                "logistic: coef rows differ in width".into(),
            ));
        }
        if self.intercept.len() != self.coef.len() {
            return Err(ClassifierError::InvalidArtifact(format!(
                "logistic: {} intercepts for {} coef rows",
                self.intercept.len(),
                self.coef.len()
            )));
        }
        let finite = self
            .coef
            .iter()
            .flatten()
            .chain(self.intercept.iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(ClassifierError::InvalidArtifact(
                "logistic: non-finite weight".into(),
            ));
        }

        let n_classes = if self.coef.len() == 1 { 2 } else { self.coef.len() };
        if self.classes.is_empty() {
            self.classes = (0..n_classes).collect();
        }
        if self.classes.len() != n_classes {
            return Err(ClassifierError::InvalidArtifact(format!(
                "logistic: {} class values for {} classes",
                self.classes.len(),
                n_classes
            )));
        }
        ensure_unique(&self.classes)?;
        Ok(self)
    }

    fn decision(&self, features: &[f32]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| {
                row.iter()
                    .zip(features)
                    .map(|(w, x)| w * f64::from(*x))
                    .sum::<f64>()
                    + b
            })
            .collect()
    }

    fn is_binary(&self) -> bool {
        self.coef.len() == 1
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn input_width(&self) -> usize {
        self.coef.first().map_or(0, Vec::len)
    }

    fn classes(&self) -> &[usize] {
        &self.classes
    }

    fn predict(&self, features: &[f32]) -> Result<usize, ClassifierError> {
        check_width(self.input_width(), features)?;
        let scores = self.decision(features);
        let idx = if self.is_binary() {
            usize::from(scores[0] > 0.0)
        } else {
            argmax(&scores).map_or(0, |(i, _)| i)
        };
        Ok(self.classes[idx])
    }

    fn predict_proba(&self, features: &[f32]) -> Result<Vec<f64>, ClassifierError> {
        check_width(self.input_width(), features)?;
        let scores = self.decision(features);
        if self.is_binary() {
            let p = sigmoid(scores[0]);
            return Ok(vec![1.0 - p, p]);
        }
        Ok(softmax(&scores))
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

pub(crate) fn ensure_unique(classes: &[usize]) -> Result<(), ClassifierError> {
    let mut seen = classes.to_vec();
    seen.sort_unstable();
    seen.dedup();
    if seen.len() != classes.len() {
        return Err(ClassifierError::InvalidArtifact(
            "duplicate class values".into(),
        ));
    }
    Ok(())
}
