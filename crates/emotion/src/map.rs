use fxhash::FxHashMap;
use std::collections::BTreeMap;

use crate::Emotion;

/// Native label to target emotion pairs used when nothing is configured.
pub const DEFAULT_EMOTION_MAP: [(&str, Emotion); 7] = [
    ("anger", Emotion::Anger),
    ("disgust", Emotion::Anger),
    ("fear", Emotion::Fear),
    ("sadness", Emotion::Sadness),
    ("joy", Emotion::Hope),
    ("neutral", Emotion::Trust),
    ("surprise", Emotion::Trust),
];

/// Immutable many-to-one lookup from native classifier labels to [`Emotion`].
///
/// Keys are stored lowercased and lookups lowercase their argument, so
/// `"Joy"` and `"joy"` resolve the same way. Labels with no entry resolve to
/// `None` and are dropped by aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionMap {
    entries: FxHashMap<String, Emotion>,
}

impl EmotionMap {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Emotion)>,
        S: AsRef<str>,
    {
        let entries = pairs
            .into_iter()
            .map(|(label, emotion)| (label.as_ref().trim().to_lowercase(), emotion))
            .collect();
        Self { entries }
    }

    pub fn get(&self, native_label: &str) -> Option<Emotion> {
        self.entries
            .get(&native_label.trim().to_lowercase())
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by native label, for logging and config dumps.
    pub fn to_sorted(&self) -> BTreeMap<String, Emotion> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

impl Default for EmotionMap {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_EMOTION_MAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mapping() {
        let map = EmotionMap::default();
        assert_eq!(map.len(), 7);
        assert_eq!(map.get("joy"), Some(Emotion::Hope));
        assert_eq!(map.get("disgust"), Some(Emotion::Anger));
        assert_eq!(map.get("surprise"), Some(Emotion::Trust));
        assert_eq!(map.get("optimism"), None);
    }

    #[test]
    fn lookup_ignores_case() {
        let map = EmotionMap::default();
        assert_eq!(map.get("FEAR"), Some(Emotion::Fear));
        let custom = EmotionMap::from_pairs([("Optimism", Emotion::Hope)]);
        assert_eq!(custom.get("optimism"), Some(Emotion::Hope));
    }

    #[test]
    fn every_target_reachable_by_default() {
        let targets = EmotionMap::default().to_sorted();
        for e in Emotion::ALL {
            assert!(targets.values().any(|t| *t == e), "{e} unreachable");
        }
    }
}
