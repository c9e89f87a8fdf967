//! Workspace umbrella crate for climasense.
//!
//! Stitches the stage crates into one [`Pipeline`]: raw text is cleaned,
//! encoded into a single vector, classified for sentiment and misinformation,
//! and scored for emotion, then merged into an [`InferenceResult`].
//!
//! ```
//! use std::sync::Arc;
//! use climasense::{
//!     ClassifierAdapter, ClassifierArtifact, EmotionAggregator, EmotionMap, Normalizer,
//!     Pipeline, PipelineParts, StubEmotionClassifier, StubEncoder,
//! };
//!
//! let sentiment = ClassifierArtifact::from_json(
//!     r#"{"kind":"logistic","coef":[[1,0],[0,1],[-1,-1]],"intercept":[0,0,0]}"#,
//! )
//! .unwrap()
//! .into_classifier()
//! .unwrap();
//! let misinformation = ClassifierArtifact::from_json(
//!     r#"{"kind":"logistic","coef":[[1,-1]],"intercept":[0]}"#,
//! )
//! .unwrap()
//! .into_classifier()
//! .unwrap();
//!
//! let pipeline = Pipeline::new(PipelineParts {
//!     normalizer: Arc::new(Normalizer::default()),
//!     encoder: Arc::new(StubEncoder::new(2)),
//!     sentiment: ClassifierAdapter::new(sentiment).unwrap(),
//!     misinformation: ClassifierAdapter::new(misinformation).unwrap(),
//!     emotion: EmotionAggregator::new(
//!         Arc::new(StubEmotionClassifier::new(["fear", "joy"])),
//!         EmotionMap::default(),
//!     ),
//! })
//! .unwrap();
//!
//! let result = pipeline.infer("Climate change is fake, wake up sheeple").unwrap();
//! assert_eq!(result.processed_text, "climate change fake wake sheeple");
//! assert!((0.0..=1.0).contains(&result.sentiment_confidence));
//! ```

pub mod config;

pub use crate::config::{ClassifierConfig, ConfigLoadError, PipelineConfig};
pub use canonical::{CanonicalError, CleanConfig, Normalizer, TextNormalizer};
pub use classifier::{
    load_classifier, ClassLabel, ClassifierAdapter, ClassifierArtifact, ClassifierError,
    Misinformation, Prediction, ProbabilisticClassifier, Sentiment,
};
pub use emotion::{
    Emotion, EmotionAggregator, EmotionClassifier, EmotionConfig, EmotionDetection,
    EmotionError, EmotionMap, NativeScore, StubEmotionClassifier,
};
pub use semantic::{
    load_encoder, Embedding, EncoderConfig, SemanticError, StubEncoder, TextEncoder,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Pipeline stage, used to attribute failures and latencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Normalize,
    Encode,
    Sentiment,
    Misinformation,
    Emotion,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Encode => "encode",
            Stage::Sentiment => "sentiment",
            Stage::Misinformation => "misinformation",
            Stage::Emotion => "emotion",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a stage failure.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Canonical(#[from] CanonicalError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Emotion(#[from] EmotionError),
    /// Stages that load fine individually but do not fit together.
    #[error("{0}")]
    Wiring(String),
}

impl StageError {
    fn is_configuration(&self) -> bool {
        match self {
            StageError::Canonical(_) | StageError::Wiring(_) => true,
            StageError::Semantic(e) => e.is_configuration(),
            StageError::Classifier(e) => e.is_configuration(),
            StageError::Emotion(e) => e.is_configuration(),
        }
    }
}

/// Errors that can occur while building the pipeline or serving a request.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input was empty or whitespace only. No model ran.
    #[error("input text is empty")]
    EmptyInput,
    /// The stage is wired up wrong; no request can succeed until the
    /// configuration or artifacts are fixed.
    #[error("{stage} stage is misconfigured: {source}")]
    Configuration {
        stage: Stage,
        #[source]
        source: StageError,
    },
    /// The stage failed for this request only.
    #[error("{stage} stage failed: {source}")]
    Inference {
        stage: Stage,
        #[source]
        source: StageError,
    },
}

impl PipelineError {
    /// Classifies a stage error as configuration or per-request failure.
    pub fn at(stage: Stage, source: impl Into<StageError>) -> Self {
        let source = source.into();
        if source.is_configuration() {
            PipelineError::Configuration { stage, source }
        } else {
            PipelineError::Inference { stage, source }
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::EmptyInput => None,
            PipelineError::Configuration { stage, .. } | PipelineError::Inference { stage, .. } => {
                Some(*stage)
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::EmptyInput)
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, PipelineError::Configuration { .. })
    }
}

/// Observer for per-stage latency and outcome. Installed per pipeline with
/// [`Pipeline::with_metrics`].
pub trait PipelineMetrics: Send + Sync {
    fn record_stage(&self, stage: Stage, latency: Duration, result: Result<(), &PipelineError>);

    /// Called once per `infer` call, including rejected empty inputs.
    fn record_request(&self, _latency: Duration, _result: Result<(), &PipelineError>) {}
}

struct MetricsSpan<'a> {
    recorder: &'a dyn PipelineMetrics,
    start: Instant,
}

impl<'a> MetricsSpan<'a> {
    fn start(recorder: Option<&'a Arc<dyn PipelineMetrics>>) -> Option<Self> {
        recorder.map(|recorder| Self {
            recorder: &**recorder,
            start: Instant::now(),
        })
    }

    fn record_stage(self, stage: Stage, result: Result<(), &PipelineError>) {
        self.recorder.record_stage(stage, self.start.elapsed(), result);
    }

    fn record_request(self, result: Result<(), &PipelineError>) {
        self.recorder.record_request(self.start.elapsed(), result);
    }
}

/// Merged per-request output. Confidences are kept at full precision.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult {
    pub input_text: String,
    pub processed_text: String,
    pub sentiment: Sentiment,
    pub sentiment_confidence: f64,
    pub misinformation: Misinformation,
    pub misinformation_confidence: f64,
    pub emotion: Emotion,
    /// Aggregated emotion total; not bounded by 1.
    pub emotion_confidence: f64,
}

impl InferenceResult {
    /// Presentation record with confidences rounded to 4 decimal places.
    pub fn to_response(&self) -> InferenceResponse {
        InferenceResponse {
            input_text: self.input_text.clone(),
            processed_text: self.processed_text.clone(),
            sentiment: self.sentiment,
            sentiment_confidence: round4(self.sentiment_confidence),
            misinformation: self.misinformation,
            misinformation_confidence: round4(self.misinformation_confidence),
            emotion: self.emotion,
            emotion_confidence: round4(self.emotion_confidence),
        }
    }
}

/// Serializable response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub input_text: String,
    pub processed_text: String,
    pub sentiment: Sentiment,
    pub sentiment_confidence: f64,
    pub misinformation: Misinformation,
    pub misinformation_confidence: f64,
    pub emotion: Emotion,
    pub emotion_confidence: f64,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Pre-built stage handles for [`Pipeline::new`].
pub struct PipelineParts {
    pub normalizer: Arc<dyn TextNormalizer>,
    pub encoder: Arc<dyn TextEncoder>,
    pub sentiment: ClassifierAdapter<Sentiment>,
    pub misinformation: ClassifierAdapter<Misinformation>,
    pub emotion: EmotionAggregator,
}

/// Loaded, read-only inference pipeline. Share it behind an `Arc`; `infer`
/// takes `&self` and holds no per-request state.
pub struct Pipeline {
    normalizer: Arc<dyn TextNormalizer>,
    encoder: Arc<dyn TextEncoder>,
    sentiment: ClassifierAdapter<Sentiment>,
    misinformation: ClassifierAdapter<Misinformation>,
    emotion: EmotionAggregator,
    metrics: Option<Arc<dyn PipelineMetrics>>,
}

impl Pipeline {
    /// Assembles a pipeline from loaded stages. The encoder's width must equal
    /// both classifiers' input widths.
    pub fn new(parts: PipelineParts) -> Result<Self, PipelineError> {
        let dim = parts.encoder.dimension();
        for (stage, width) in [
            (Stage::Sentiment, parts.sentiment.input_width()),
            (Stage::Misinformation, parts.misinformation.input_width()),
        ] {
            if width != dim {
                return Err(PipelineError::Configuration {
                    stage,
                    source: StageError::Wiring(format!(
                        "classifier expects {width}-dim vectors, encoder '{}' produces {dim}",
                        parts.encoder.model_name()
                    )),
                });
            }
        }

        Ok(Self {
            normalizer: parts.normalizer,
            encoder: parts.encoder,
            sentiment: parts.sentiment,
            misinformation: parts.misinformation,
            emotion: parts.emotion,
            metrics: None,
        })
    }

    /// Loads every model named by `cfg`. Blocks until all are resident; any
    /// failure means no pipeline.
    pub fn from_config(cfg: &PipelineConfig) -> Result<Self, PipelineError> {
        let started = Instant::now();

        let normalizer = Normalizer::new(cfg.canonical.clone())
            .map_err(|e| PipelineError::at(Stage::Normalize, e))?;
        let encoder =
            load_encoder(&cfg.encoder).map_err(|e| PipelineError::at(Stage::Encode, e))?;
        let sentiment = load_classifier(&cfg.sentiment.path)
            .and_then(ClassifierAdapter::new)
            .map_err(|e| PipelineError::at(Stage::Sentiment, e))?;
        let misinformation = load_classifier(&cfg.misinformation.path)
            .and_then(ClassifierAdapter::new)
            .map_err(|e| PipelineError::at(Stage::Misinformation, e))?;
        let emotion = EmotionAggregator::from_config(&cfg.emotion)
            .map_err(|e| PipelineError::at(Stage::Emotion, e))?;

        let pipeline = Self::new(PipelineParts {
            normalizer: Arc::new(normalizer),
            encoder,
            sentiment,
            misinformation,
            emotion,
        })?;

        tracing::info!(
            encoder = pipeline.encoder.model_name(),
            dim = pipeline.embedding_dim(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline ready"
        );
        Ok(pipeline)
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn embedding_dim(&self) -> usize {
        self.encoder.dimension()
    }

    /// Runs every stage for one text. All-or-nothing: on error no partial
    /// result is produced.
    pub fn infer(&self, text: &str) -> Result<InferenceResult, PipelineError> {
        let request = MetricsSpan::start(self.metrics.as_ref());
        let result = self.run(text);
        if let Some(span) = request {
            span.record_request(result.as_ref().map(|_| ()));
        }
        if let Err(err) = &result {
            if !err.is_validation() {
                tracing::warn!(
                    stage = ?err.stage().map(|s| s.as_str()),
                    error = %err,
                    "inference failed"
                );
            }
        }
        result
    }

    /// Independent `infer` per text, in order.
    pub fn infer_batch(&self, texts: &[&str]) -> Vec<Result<InferenceResult, PipelineError>> {
        texts.iter().map(|text| self.infer(text)).collect()
    }

    fn run(&self, text: &str) -> Result<InferenceResult, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let processed_text = self.normalizer.clean(text);
        tracing::debug!(processed = %processed_text, "text cleaned");

        let vector = self.stage(Stage::Encode, || -> Result<Embedding, SemanticError> {
            let vectors = self.encoder.encode(&[processed_text.as_str()])?;
            let count = vectors.len();
            match (count, vectors.into_iter().next()) {
                (1, Some(vector)) => Ok(vector),
                _ => Err(SemanticError::Inference(format!(
                    "encoder returned {count} vectors for one text"
                ))),
            }
        })?;

        let sentiment = self.stage(Stage::Sentiment, || {
            self.sentiment.classify(vector.as_slice())
        })?;
        let misinformation = self.stage(Stage::Misinformation, || {
            self.misinformation.classify(vector.as_slice())
        })?;
        let emotion = self.stage(Stage::Emotion, || self.emotion.detect(text))?;

        tracing::debug!(
            sentiment = %sentiment.label,
            misinformation = %misinformation.label,
            emotion = %emotion.emotion,
            "inference complete"
        );

        Ok(InferenceResult {
            input_text: text.to_string(),
            processed_text,
            sentiment: sentiment.label,
            sentiment_confidence: sentiment.confidence,
            misinformation: misinformation.label,
            misinformation_confidence: misinformation.confidence,
            emotion: emotion.emotion,
            emotion_confidence: emotion.confidence,
        })
    }

    fn stage<T, E>(
        &self,
        stage: Stage,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, PipelineError>
    where
        E: Into<StageError>,
    {
        let span = MetricsSpan::start(self.metrics.as_ref());
        let result = f().map_err(|e| PipelineError::at(stage, e));
        if let Some(span) = span {
            span.record_stage(stage, result.as_ref().map(|_| ()));
        }
        result
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("encoder", &self.encoder.model_name())
            .field("dim", &self.encoder.dimension())
            .field("sentiment", &self.sentiment)
            .field("misinformation", &self.misinformation)
            .field("emotion", &self.emotion)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn logistic(json: &str) -> Arc<dyn ProbabilisticClassifier> {
        ClassifierArtifact::from_json(json)
            .unwrap()
            .into_classifier()
            .unwrap()
    }

    fn parts(dim: usize) -> PipelineParts {
        let zeros = vec!["0"; dim].join(",");
        let sentiment = logistic(&format!(
            r#"{{"kind":"logistic","coef":[[{zeros}],[{zeros}],[{zeros}]],"intercept":[0.1,0.0,0.3]}}"#
        ));
        let misinformation = logistic(&format!(
            r#"{{"kind":"logistic","coef":[[{zeros}]],"intercept":[2.0]}}"#
        ));
        PipelineParts {
            normalizer: Arc::new(Normalizer::default()),
            encoder: Arc::new(StubEncoder::new(dim)),
            sentiment: ClassifierAdapter::new(sentiment).unwrap(),
            misinformation: ClassifierAdapter::new(misinformation).unwrap(),
            emotion: EmotionAggregator::new(
                Arc::new(StubEmotionClassifier::new(["anger", "joy", "neutral"])),
                EmotionMap::default(),
            ),
        }
    }

    #[test]
    fn infer_merges_every_stage() {
        let pipeline = Pipeline::new(parts(8)).unwrap();
        let out = pipeline.infer("Climate change is fake, wake up sheeple").unwrap();
        assert_eq!(out.input_text, "Climate change is fake, wake up sheeple");
        assert_eq!(out.processed_text, "climate change fake wake sheeple");
        assert_eq!(out.sentiment, Sentiment::Positive);
        assert_eq!(out.misinformation, Misinformation::Misinformation);
        assert!(out.misinformation_confidence > 0.5);
        assert!(out.emotion_confidence > 0.0);
    }

    #[test]
    fn blank_input_is_validation_error() {
        let pipeline = Pipeline::new(parts(8)).unwrap();
        for text in ["", "   ", "\n\t"] {
            let err = pipeline.infer(text).unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.stage(), None);
        }
    }

    #[test]
    fn all_noise_input_still_classified() {
        let pipeline = Pipeline::new(parts(8)).unwrap();
        let out = pipeline.infer("it is what it is").unwrap();
        assert_eq!(out.processed_text, "");
    }

    #[test]
    fn dimension_mismatch_rejected_at_construction() {
        let mut p = parts(8);
        p.encoder = Arc::new(StubEncoder::new(16));
        let err = Pipeline::new(p).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.stage(), Some(Stage::Sentiment));
    }

    #[test]
    fn response_rounds_to_four_places() {
        let result = InferenceResult {
            input_text: "x".into(),
            processed_text: String::new(),
            sentiment: Sentiment::Neutral,
            sentiment_confidence: 0.123_456,
            misinformation: Misinformation::Scientific,
            misinformation_confidence: 0.999_96,
            emotion: Emotion::Trust,
            emotion_confidence: 1.234_49,
        };
        let response = result.to_response();
        assert_eq!(response.sentiment_confidence, 0.1235);
        assert_eq!(response.misinformation_confidence, 1.0);
        assert_eq!(response.emotion_confidence, 1.2345);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["sentiment"], "Neutral");
        assert_eq!(json["misinformation"], "Scientific");
        assert_eq!(json["emotion"], "Trust");
    }

    #[test]
    fn error_classification() {
        let err = PipelineError::at(Stage::Encode, SemanticError::Inference("oom".into()));
        assert!(matches!(err, PipelineError::Inference { stage: Stage::Encode, .. }));
        let err = PipelineError::at(
            Stage::Sentiment,
            ClassifierError::DimensionMismatch { expected: 768, actual: 8 },
        );
        assert!(err.is_configuration());
        assert!(err.to_string().starts_with("sentiment stage is misconfigured"));
    }

    #[derive(Default)]
    struct RecordingMetrics {
        stages: Mutex<Vec<(Stage, bool)>>,
        requests: Mutex<Vec<bool>>,
    }

    impl PipelineMetrics for RecordingMetrics {
        fn record_stage(
            &self,
            stage: Stage,
            _latency: Duration,
            result: Result<(), &PipelineError>,
        ) {
            self.stages.lock().unwrap().push((stage, result.is_ok()));
        }

        fn record_request(&self, _latency: Duration, result: Result<(), &PipelineError>) {
            self.requests.lock().unwrap().push(result.is_ok());
        }
    }

    #[test]
    fn metrics_observe_each_stage() {
        let metrics = Arc::new(RecordingMetrics::default());
        let pipeline = Pipeline::new(parts(4)).unwrap().with_metrics(metrics.clone());

        pipeline.infer("Sea levels keep rising").unwrap();
        let _ = pipeline.infer("  ");

        let stages = metrics.stages.lock().unwrap().clone();
        assert_eq!(
            stages,
            vec![
                (Stage::Encode, true),
                (Stage::Sentiment, true),
                (Stage::Misinformation, true),
                (Stage::Emotion, true),
            ]
        );
        assert_eq!(*metrics.requests.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn infer_batch_keeps_order_and_independence() {
        let pipeline = Pipeline::new(parts(4)).unwrap();
        let results = pipeline.infer_batch(&["warming oceans", "", "melting glaciers"]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().input_text, "warming oceans");
        assert!(results[1].as_ref().unwrap_err().is_validation());
        assert_eq!(results[2].as_ref().unwrap().input_text, "melting glaciers");
    }
}
