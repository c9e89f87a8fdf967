use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::EmotionError;

/// Target emotion taxonomy reported by the pipeline.
///
/// Declaration order is the tie-break order: when two emotions aggregate to
/// the same total, the one listed first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    Fear,
    Anger,
    Hope,
    Sadness,
    Trust,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Fear,
        Emotion::Anger,
        Emotion::Hope,
        Emotion::Sadness,
        Emotion::Trust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Fear => "Fear",
            Emotion::Anger => "Anger",
            Emotion::Hope => "Hope",
            Emotion::Sadness => "Sadness",
            Emotion::Trust => "Trust",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = EmotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EmotionError::InvalidConfig(format!("unknown emotion '{s}'")))
    }
}
