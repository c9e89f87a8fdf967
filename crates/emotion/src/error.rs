use semantic::SemanticError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmotionError {
    /// Loading or running the underlying text model failed.
    #[error("emotion model: {0}")]
    Model(#[from] SemanticError),
    #[error("invalid emotion configuration: {0}")]
    InvalidConfig(String),
    /// The model's output does not line up with the configured labels.
    #[error("emotion model returned {actual} scores but {expected} labels are configured")]
    LabelCountMismatch { expected: usize, actual: usize },
    /// A native score that cannot be aggregated.
    #[error("invalid score {score} for emotion label '{label}'")]
    InvalidScore { label: String, score: f64 },
}

impl EmotionError {
    pub fn is_configuration(&self) -> bool {
        match self {
            EmotionError::Model(e) => e.is_configuration(),
            EmotionError::InvalidConfig(_) | EmotionError::LabelCountMismatch { .. } => true,
            EmotionError::InvalidScore { .. } => false,
        }
    }
}
