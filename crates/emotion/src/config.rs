use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::map::DEFAULT_EMOTION_MAP;
use crate::{Emotion, EmotionError, EmotionMap};

/// How raw logits become per-label scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Scores sum to one across labels.
    #[default]
    Softmax,
    /// Each label scored independently in `[0, 1]`.
    Sigmoid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmotionConfig {
    /// `"onnx"` or `"stub"`.
    pub mode: String,
    pub model_name: String,
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub max_sequence_length: usize,
    pub pad_token_id: u32,
    pub intra_threads: i16,
    /// Native labels in the model's output column order.
    pub labels: Vec<String>,
    pub activation: Activation,
    /// Native label to target emotion. Replaces the built-in table when set.
    pub map: BTreeMap<String, Emotion>,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            mode: "onnx".into(),
            model_name: "emotion-english-distilroberta-base".into(),
            model_path: PathBuf::from("./models/emotion-english-distilroberta-base/model.onnx"),
            tokenizer_path: PathBuf::from(
                "./models/emotion-english-distilroberta-base/tokenizer.json",
            ),
            max_sequence_length: 512,
            pad_token_id: 1,
            intra_threads: 1,
            labels: ["anger", "disgust", "fear", "joy", "neutral", "sadness", "surprise"]
                .into_iter()
                .map(String::from)
                .collect(),
            activation: Activation::Softmax,
            map: DEFAULT_EMOTION_MAP
                .into_iter()
                .map(|(label, emotion)| (label.to_string(), emotion))
                .collect(),
        }
    }
}

impl EmotionConfig {
    pub fn validate(&self) -> Result<(), EmotionError> {
        if !matches!(self.mode.as_str(), "onnx" | "stub") {
            return Err(EmotionError::InvalidConfig(format!(
                "unknown emotion mode '{}'",
                self.mode
            )));
        }
        if self.labels.is_empty() {
            return Err(EmotionError::InvalidConfig("labels must not be empty".into()));
        }
        if self.labels.iter().any(|l| l.trim().is_empty()) {
            return Err(EmotionError::InvalidConfig("labels must not be blank".into()));
        }
        if self.max_sequence_length == 0 {
            return Err(EmotionError::InvalidConfig(
                "max_sequence_length must be > 0".into(),
            ));
        }
        if self.intra_threads < 1 {
            return Err(EmotionError::InvalidConfig(
                "intra_threads must be >= 1".into(),
            ));
        }
        let map = self.emotion_map();
        if !self.labels.iter().any(|l| map.get(l).is_some()) {
            return Err(EmotionError::InvalidConfig(
                "no configured label maps onto the emotion taxonomy".into(),
            ));
        }
        Ok(())
    }

    pub fn emotion_map(&self) -> EmotionMap {
        EmotionMap::from_pairs(self.map.iter().map(|(k, v)| (k.as_str(), *v)))
    }
}
