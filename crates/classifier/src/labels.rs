use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed label enumeration. `ALL` is in class-index order: class value `i`
/// maps to `ALL[i]`. Reordering `ALL` silently corrupts every prediction.
pub trait ClassLabel:
    Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Stance of a text towards climate change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl ClassLabel for Sentiment {
    const ALL: &'static [Self] = &[Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a text reads as scientifically grounded or as misinformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Misinformation {
    Scientific,
    Misinformation,
}

impl ClassLabel for Misinformation {
    const ALL: &'static [Self] = &[Misinformation::Scientific, Misinformation::Misinformation];

    fn as_str(&self) -> &'static str {
        match self {
            Misinformation::Scientific => "Scientific",
            Misinformation::Misinformation => "Misinformation",
        }
    }
}

impl fmt::Display for Misinformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
