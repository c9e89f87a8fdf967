use thiserror::Error;

/// Errors that can occur while building a [`Normalizer`](crate::Normalizer).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
