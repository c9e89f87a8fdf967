//! Pipeline configuration.
//!
//! One document configures every stage. Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional file (`climasense.toml`, `.yaml` or `.json` in the working
//!    directory, or an explicit path)
//! 3. environment variables prefixed `CLIMASENSE__`, nested with `__`
//!    (`CLIMASENSE__ENCODER__MODE=stub`)
//!
//! A `.env` file is read into the environment first when present.
//!
//! ```toml
//! log_level = "info"
//!
//! [canonical]
//! min_token_len = 3
//!
//! [encoder]
//! model_path = "models/distilroberta-base-climate-f/model.onnx"
//! tokenizer_path = "models/distilroberta-base-climate-f/tokenizer.json"
//! embedding_dim = 768
//!
//! [sentiment]
//! path = "models/sentiment_rf.json"
//!
//! [misinformation]
//! path = "models/misinformation_classifier.json"
//!
//! [emotion]
//! activation = "softmax"
//! ```

use std::path::{Path, PathBuf};

use canonical::CleanConfig;
use emotion::EmotionConfig;
use semantic::EncoderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "CLIMASENSE";
const DEFAULT_FILE_STEM: &str = "climasense";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Location of a fitted classifier artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub canonical: CleanConfig,
    pub encoder: EncoderConfig,
    pub sentiment: ClassifierConfig,
    pub misinformation: ClassifierConfig,
    pub emotion: EmotionConfig,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canonical: CleanConfig::default(),
            encoder: EncoderConfig::default(),
            sentiment: ClassifierConfig {
                path: PathBuf::from("./models/sentiment_rf.json"),
            },
            misinformation: ClassifierConfig {
                path: PathBuf::from("./models/misinformation_classifier.json"),
            },
            emotion: EmotionConfig::default(),
            log_level: "info".into(),
            log_json: false,
        }
    }
}

impl PipelineConfig {
    /// Loads from `climasense.*` in the working directory if present, then
    /// the environment.
    pub fn load() -> Result<Self, ConfigLoadError> {
        load_dotenv();
        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name(DEFAULT_FILE_STEM).required(false));
        Self::finish(builder, environment())
    }

    /// Loads from an explicit file (format from its extension), then the
    /// environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound(path.display().to_string()));
        }
        load_dotenv();
        let builder = ::config::Config::builder().add_source(::config::File::from(path));
        Self::finish(builder, environment())
    }

    fn finish(
        builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
        env: ::config::Environment,
    ) -> Result<Self, ConfigLoadError> {
        let cfg: PipelineConfig = builder.add_source(env).build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Cheap structural checks. Missing model files are reported later, by
    /// the stage that loads them.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.canonical.version == 0 {
            return Err(ConfigLoadError::Validation(
                "canonical.version must be >= 1".into(),
            ));
        }
        self.encoder
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("encoder: {e}")))?;
        self.emotion
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("emotion: {e}")))?;
        for (name, classifier) in [
            ("sentiment", &self.sentiment),
            ("misinformation", &self.misinformation),
        ] {
            if classifier.path.as_os_str().is_empty() {
                return Err(ConfigLoadError::Validation(format!(
                    "{name}.path must not be empty"
                )));
            }
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "log_level must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// `CLIMASENSE__SECTION__KEY` variables, layered over any file.
fn environment() -> ::config::Environment {
    ::config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
}
