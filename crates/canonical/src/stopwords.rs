use fxhash::FxHashSet;

/// English stopword list (NLTK corpus, 179 entries).
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Builds the lookup set from the built-in list plus caller-supplied extras.
/// Extras are lowercased so they match lowercased tokens.
pub(crate) fn build_stopword_set<S: AsRef<str>>(extra: &[S]) -> FxHashSet<String> {
    let mut set: FxHashSet<String> = FxHashSet::with_capacity_and_hasher(
        ENGLISH_STOPWORDS.len() + extra.len(),
        Default::default(),
    );
    set.extend(ENGLISH_STOPWORDS.iter().map(|w| (*w).to_string()));
    set.extend(
        extra
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty()),
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_list_has_no_duplicates() {
        let set = build_stopword_set::<&str>(&[]);
        assert_eq!(set.len(), ENGLISH_STOPWORDS.len());
    }

    #[test]
    fn extras_are_lowercased_and_trimmed() {
        let set = build_stopword_set(&[" RT ", "", "Via"]);
        assert!(set.contains("rt"));
        assert!(set.contains("via"));
        assert!(!set.contains(""));
    }
}
