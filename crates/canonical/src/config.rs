//! Configuration types for the text cleaning stage.
//!
//! [`CleanConfig`] switches the individual cleaning rules on and off. The
//! defaults reproduce the preprocessing the downstream classifiers were fit
//! against, so changing them at serve time shifts the input distribution.
//!
//! # Versioning
//!
//! The `version` field tracks behavior changes of the cleaning rules. Version
//! 0 is reserved and rejected by [`Normalizer::new`](crate::Normalizer::new).
//!
//! # Examples
//!
//! ```rust
//! use canonical::CleanConfig;
//!
//! let config = CleanConfig::default();
//! assert_eq!(config.version, 1);
//! assert!(config.lowercase);
//! assert_eq!(config.min_token_len, 3);
//! ```

use serde::{Deserialize, Serialize};

/// Configuration for the text cleaning stage.
///
/// Serialized form:
///
/// ```json
/// {
///   "version": 1,
///   "normalize_unicode": true,
///   "lowercase": true,
///   "strip_urls": true,
///   "strip_mentions": true,
///   "strip_hashtags": true,
///   "letters_only": true,
///   "remove_stopwords": true,
///   "min_token_len": 3,
///   "extra_stopwords": []
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CleanConfig {
    /// Version of the cleaning rules. Must be >= 1.
    pub version: u32,

    /// Apply Unicode NFKC normalization before any other rule.
    ///
    /// Folds compatibility forms (full-width letters, ligatures) into their
    /// ASCII counterparts so the letters-only filter keeps them.
    pub normalize_unicode: bool,

    /// Lowercase the text. Runs before the letters-only filter, which only
    /// keeps `a-z`.
    pub lowercase: bool,

    /// Remove every substring starting with `http` or `www` up to the next
    /// whitespace.
    pub strip_urls: bool,

    /// Remove `@handle` mentions.
    pub strip_mentions: bool,

    /// Remove `#hashtag` tokens.
    pub strip_hashtags: bool,

    /// Drop every character that is neither an ASCII lowercase letter nor
    /// whitespace. Digits, emoji and punctuation all go.
    pub letters_only: bool,

    /// Drop English stopwords.
    pub remove_stopwords: bool,

    /// Tokens shorter than this (in bytes, which equals chars after the
    /// letters-only filter) are dropped. `0` disables the filter.
    pub min_token_len: usize,

    /// Additional stopwords merged into the built-in English list.
    pub extra_stopwords: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            lowercase: true,
            strip_urls: true,
            strip_mentions: true,
            strip_hashtags: true,
            letters_only: true,
            remove_stopwords: true,
            min_token_len: 3,
            extra_stopwords: Vec::new(),
        }
    }
}
