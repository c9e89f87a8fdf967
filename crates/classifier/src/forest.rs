use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::logistic::ensure_unique;
use crate::model::{argmax, check_width, ProbabilisticClassifier};

const LEAF: i64 = -1;

/// One fitted decision tree in the flat array layout scikit-learn uses
/// (`tree_.children_left`, `tree_.children_right`, ...). Node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts or fractions; only leaf rows are read.
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ClassifierError> {
        let nodes = self.children_left.len();
        if nodes == 0 {
            return Err(invalid("tree has no nodes"));
        }
        if self.children_right.len() != nodes
            || self.feature.len() != nodes
            || self.threshold.len() != nodes
            || self.value.len() != nodes
        {
            return Err(invalid("tree arrays differ in length"));
        }
        for node in 0..nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(invalid("node has exactly one child"));
                }
                let row = &self.value[node];
                if row.len() != n_classes {
                    return Err(invalid("leaf value width differs from class count"));
                }
                if row.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(invalid("leaf value is negative or non-finite"));
                }
                if row.iter().sum::<f64>() <= 0.0 {
                    return Err(invalid("leaf value sums to zero"));
                }
                continue;
            }
            // Children always come after their parent, so traversal terminates.
            for child in [left, right] {
                let in_range = usize::try_from(child).is_ok_and(|c| c > node && c < nodes);
                if !in_range {
                    return Err(invalid("child index out of range"));
                }
            }
            let feature_ok = usize::try_from(self.feature[node]).is_ok_and(|f| f < n_features);
            if !feature_ok {
                return Err(invalid("split feature out of range"));
            }
            if self.threshold[node].is_nan() {
                return Err(invalid("split threshold is NaN"));
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf `features` falls into.
    fn leaf_distribution(&self, features: &[f32]) -> Vec<f64> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            // Indices were range-checked in `validate`.
            let feature = self.feature[node] as usize;
            let next = if f64::from(features[feature]) <= self.threshold[node] {
                self.children_left[node]
            } else {
                self.children_right[node]
            };
            node = next as usize;
        }
        let row = &self.value[node];
        let total: f64 = row.iter().sum();
        row.iter().map(|v| v / total).collect()
    }
}

/// Averaged ensemble of [`DecisionTree`]s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RandomForest {
    pub n_features: usize,
    #[serde(default)]
    pub classes: Vec<usize>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validated(mut self) -> Result<Self, ClassifierError> {
        if self.n_features == 0 {
            return Err(invalid("n_features must be > 0"));
        }
        let Some(first) = self.trees.first() else {
            return Err(invalid("forest has no trees"));
        };
        let n_classes = first
            .children_left
            .iter()
            .position(|c| *c == LEAF)
            .and_then(|leaf| first.value.get(leaf))
            .map_or(0, Vec::len);
        if n_classes < 2 {
            return Err(invalid("forest must distinguish at least two classes"));
        }
        if self.classes.is_empty() {
            self.classes = (0..n_classes).collect();
        }
        if self.classes.len() != n_classes {
            return Err(ClassifierError::InvalidArtifact(format!(
                "random_forest: {} class values for {} classes",
                self.classes.len(),
                n_classes
            )));
        }
        ensure_unique(&self.classes)?;
        for tree in &self.trees {
            tree.validate(self.n_features, n_classes)?;
        }
        Ok(self)
    }

    fn summed_leaves(&self, features: &[f32]) -> Vec<f64> {
        let mut totals = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in totals.iter_mut().zip(tree.leaf_distribution(features)) {
                *acc += p;
            }
        }
        totals
    }
}

impl ProbabilisticClassifier for RandomForest {
    fn input_width(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[usize] {
        &self.classes
    }

    fn predict(&self, features: &[f32]) -> Result<usize, ClassifierError> {
        check_width(self.n_features, features)?;
        let totals = self.summed_leaves(features);
        let idx = argmax(&totals).map_or(0, |(i, _)| i);
        Ok(self.classes[idx])
    }

    fn predict_proba(&self, features: &[f32]) -> Result<Vec<f64>, ClassifierError> {
        check_width(self.n_features, features)?;
        let n_trees = self.trees.len() as f64;
        Ok(self
            .summed_leaves(features)
            .into_iter()
            .map(|t| t / n_trees)
            .collect())
    }
}

fn invalid(msg: &str) -> ClassifierError {
    ClassifierError::InvalidArtifact(format!("random_forest: {msg}"))
}
