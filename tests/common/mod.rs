//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use climasense::{
    ClassifierAdapter, ClassifierArtifact, Embedding, EmotionAggregator, EmotionClassifier,
    EmotionError, EmotionMap, NativeScore, Normalizer, PipelineParts, ProbabilisticClassifier,
    SemanticError, StubEncoder, TextEncoder,
};

pub const DIM: usize = 16;

/// Two-tree forest over three sentiment classes, split on feature 0.
pub fn sentiment_forest_json(dim: usize) -> String {
    format!(
        r#"{{
            "kind": "random_forest",
            "n_features": {dim},
            "trees": [
                {{
                    "children_left": [1, -1, 3, -1, -1],
                    "children_right": [2, -1, 4, -1, -1],
                    "feature": [0, -2, 1, -2, -2],
                    "threshold": [0.0, -2.0, 0.0, -2.0, -2.0],
                    "value": [[3, 3, 3], [6, 1, 1], [1, 2, 5], [1, 5, 1], [0, 1, 7]]
                }},
                {{
                    "children_left": [1, -1, -1],
                    "children_right": [2, -1, -1],
                    "feature": [0, -2, -2],
                    "threshold": [0.0, -2.0, -2.0],
                    "value": [[4, 4, 4], [0.7, 0.2, 0.1], [0.1, 0.2, 0.7]]
                }}
            ]
        }}"#
    )
}

/// Binary logistic model leaning towards `Misinformation`.
pub fn misinformation_logistic_json(dim: usize) -> String {
    let mut weights = vec!["0.0".to_string(); dim];
    weights[0] = "0.5".into();
    format!(
        r#"{{"kind":"logistic","coef":[[{}]],"intercept":[1.5]}}"#,
        weights.join(",")
    )
}

pub fn classifier(json: &str) -> Arc<dyn ProbabilisticClassifier> {
    ClassifierArtifact::from_json(json)
        .expect("artifact parses")
        .into_classifier()
        .expect("artifact validates")
}

/// Stub encoder that counts calls.
pub struct CountingEncoder {
    inner: StubEncoder,
    pub calls: AtomicUsize,
}

impl CountingEncoder {
    pub fn new(dim: usize) -> Self {
        Self {
            inner: StubEncoder::new(dim),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextEncoder for CountingEncoder {
    fn model_name(&self) -> &str {
        "counting"
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, SemanticError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.encode(texts)
    }
}

/// Emotion classifier returning fixed scores, counting calls and recording
/// the text it was given.
pub struct ScriptedEmotion {
    scores: Vec<(String, f64)>,
    pub calls: AtomicUsize,
    pub last_text: std::sync::Mutex<Option<String>>,
}

impl ScriptedEmotion {
    pub fn new(scores: &[(&str, f64)]) -> Self {
        Self {
            scores: scores.iter().map(|(l, s)| (l.to_string(), *s)).collect(),
            calls: AtomicUsize::new(0),
            last_text: std::sync::Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmotionClassifier for ScriptedEmotion {
    fn name(&self) -> &str {
        "scripted"
    }

    fn score(&self, text: &str) -> Result<Vec<NativeScore>, EmotionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_text.lock() {
            *last = Some(text.to_string());
        }
        Ok(self
            .scores
            .iter()
            .map(|(l, s)| NativeScore::new(l.clone(), *s))
            .collect())
    }
}

pub fn default_emotion_scores() -> Vec<(&'static str, f64)> {
    vec![
        ("anger", 0.30),
        ("disgust", 0.25),
        ("fear", 0.05),
        ("joy", 0.05),
        ("neutral", 0.20),
        ("sadness", 0.05),
        ("surprise", 0.10),
    ]
}

pub fn parts_with(
    encoder: Arc<dyn TextEncoder>,
    emotion: Arc<dyn EmotionClassifier>,
) -> PipelineParts {
    let dim = encoder.dimension();
    PipelineParts {
        normalizer: Arc::new(Normalizer::default()),
        encoder,
        sentiment: ClassifierAdapter::new(classifier(&sentiment_forest_json(dim)))
            .expect("sentiment wiring"),
        misinformation: ClassifierAdapter::new(classifier(&misinformation_logistic_json(dim)))
            .expect("misinformation wiring"),
        emotion: EmotionAggregator::new(emotion, EmotionMap::default()),
    }
}

pub fn default_parts() -> PipelineParts {
    parts_with(
        Arc::new(StubEncoder::new(DIM)),
        Arc::new(ScriptedEmotion::new(&default_emotion_scores())),
    )
}
