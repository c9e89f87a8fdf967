//! Text cleaning for the climasense pipeline.
//!
//! Short social-media posts carry a lot of noise the downstream classifiers
//! were never trained on: links, handles, hashtags, emoji, filler words. This
//! crate strips that noise and returns a compact, lowercase, space-separated
//! string.
//!
//! ## What we do
//!
//! - Unicode NFKC normalization (configurable)
//! - Lowercasing
//! - URL, mention and hashtag removal
//! - Letters-only filtering (`a-z` and whitespace survive)
//! - Stopword and short-token removal
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence. Same text and config give the
//! same output on any machine. Cleaning never fails; input made only of noise
//! cleans to an empty string and callers must cope with that.
//!
//! ```rust
//! use canonical::{Normalizer, TextNormalizer};
//!
//! let normalizer = Normalizer::default();
//! assert_eq!(
//!     normalizer.clean("Climate change is fake, wake up sheeple"),
//!     "climate change fake wake sheeple"
//! );
//! ```

mod config;
mod error;
mod pipeline;
mod stopwords;

pub use crate::config::CleanConfig;
pub use crate::error::CanonicalError;
pub use crate::pipeline::{Normalizer, TextNormalizer};
pub use crate::stopwords::ENGLISH_STOPWORDS;
