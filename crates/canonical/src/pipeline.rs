use std::borrow::Cow;

use fxhash::FxHashSet;
use unicode_normalization::UnicodeNormalization;

use crate::config::CleanConfig;
use crate::error::CanonicalError;
use crate::stopwords::build_stopword_set;

/// The text cleaning contract consumed by the inference pipeline.
///
/// Implementations must be deterministic and must never fail: an input that
/// cleans down to nothing yields an empty string.
pub trait TextNormalizer: Send + Sync {
    fn clean(&self, text: &str) -> String;
}

/// Rule-based cleaner for short social-media text.
///
/// Built once from a [`CleanConfig`]; the stopword set is materialized at
/// construction so [`clean`](TextNormalizer::clean) only reads shared state.
#[derive(Debug, Clone)]
pub struct Normalizer {
    cfg: CleanConfig,
    stopwords: FxHashSet<String>,
}

impl Normalizer {
    pub fn new(cfg: CleanConfig) -> Result<Self, CanonicalError> {
        // Version 0 is reserved.
        if cfg.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        let stopwords = if cfg.remove_stopwords {
            build_stopword_set(&cfg.extra_stopwords)
        } else {
            FxHashSet::default()
        };
        Ok(Self { cfg, stopwords })
    }

    pub fn config(&self) -> &CleanConfig {
        &self.cfg
    }

    fn keep_token(&self, token: &str) -> bool {
        if self.cfg.min_token_len > 0 && token.chars().count() < self.cfg.min_token_len {
            return false;
        }
        !(self.cfg.remove_stopwords && self.stopwords.contains(token))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        let cfg = CleanConfig::default();
        Self {
            stopwords: build_stopword_set(&cfg.extra_stopwords),
            cfg,
        }
    }
}

impl TextNormalizer for Normalizer {
    fn clean(&self, text: &str) -> String {
        let cfg = &self.cfg;

        let mut working: Cow<str> = if cfg.normalize_unicode {
            Cow::Owned(text.nfkc().collect::<String>())
        } else {
            Cow::Borrowed(text)
        };

        if cfg.lowercase {
            working = Cow::Owned(working.to_lowercase());
        }
        if cfg.strip_urls {
            working = Cow::Owned(strip_urls(&working));
        }
        if cfg.strip_mentions || cfg.strip_hashtags {
            working = Cow::Owned(strip_tags(&working, cfg.strip_mentions, cfg.strip_hashtags));
        }
        if cfg.letters_only {
            working = Cow::Owned(
                working
                    .chars()
                    .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
                    .collect(),
            );
        }

        let mut cleaned = String::with_capacity(working.len());
        for token in working.split_whitespace().filter(|t| self.keep_token(t)) {
            if !cleaned.is_empty() {
                cleaned.push(' ');
            }
            cleaned.push_str(token);
        }
        cleaned
    }
}

/// Removes every run that starts with `http` or `www`, has at least one more
/// non-whitespace character, and extends to the next whitespace character.
/// The whitespace itself is kept, as is a bare `http` or `www`.
fn strip_urls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut skipping = false;
    for (idx, ch) in text.char_indices() {
        if skipping {
            if !ch.is_whitespace() {
                continue;
            }
            skipping = false;
        } else {
            let rest = &text[idx..];
            if starts_url(rest, "http") || starts_url(rest, "www") {
                skipping = true;
                continue;
            }
        }
        out.push(ch);
    }
    out
}

fn starts_url(rest: &str, prefix: &str) -> bool {
    rest.strip_prefix(prefix)
        .and_then(|tail| tail.chars().next())
        .is_some_and(|next| !next.is_whitespace())
}

/// Removes `@word` / `#word` runs. A marker with no word character after it is
/// left in place.
fn strip_tags(text: &str, mentions: bool, hashtags: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        let is_marker = (mentions && ch == '@') || (hashtags && ch == '#');
        if is_marker && chars.peek().is_some_and(|next| is_word_char(*next)) {
            while chars.peek().is_some_and(|next| is_word_char(*next)) {
                chars.next();
            }
            continue;
        }
        out.push(ch);
    }
    out
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
