//! Classifier stage of the climasense pipeline.
//!
//! Sentiment and misinformation detection are both "vector in, enumerated
//! label out". A fitted classifier is loaded from a JSON artifact
//! ([`ClassifierArtifact`]) and wrapped in a [`ClassifierAdapter`] that ties
//! its class values to a closed label set ([`Sentiment`], [`Misinformation`]).
//!
//! Supported artifact kinds:
//!
//! | `kind`          | model                                              |
//! |-----------------|----------------------------------------------------|
//! | `logistic`      | multinomial (softmax) or binary (sigmoid) logistic |
//! | `random_forest` | averaged decision trees in flat array layout       |
//!
//! ```
//! use classifier::{ClassifierAdapter, ClassifierArtifact, Misinformation};
//!
//! let model = ClassifierArtifact::from_json(
//!     r#"{"kind":"logistic","coef":[[4.0,-4.0]],"intercept":[0.0]}"#,
//! )
//! .unwrap()
//! .into_classifier()
//! .unwrap();
//!
//! let adapter = ClassifierAdapter::<Misinformation>::new(model).unwrap();
//! let out = adapter.classify(&[1.0, 0.0]).unwrap();
//! assert_eq!(out.label, Misinformation::Misinformation);
//! assert!(out.confidence > 0.9);
//! ```

mod adapter;
mod error;
mod forest;
mod labels;
mod logistic;
mod model;

pub use crate::adapter::{ClassifierAdapter, Prediction};
pub use crate::error::ClassifierError;
pub use crate::forest::{DecisionTree, RandomForest};
pub use crate::labels::{ClassLabel, Misinformation, Sentiment};
pub use crate::logistic::LogisticRegression;
pub use crate::model::{load_classifier, ClassifierArtifact, ProbabilisticClassifier};
