//! Stopword loading for the title word cloud.
//!
//! A local word list (one word per line) is used when present; otherwise a
//! small built-in English set.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Built-in fallback set.
pub const DEFAULT_STOPWORDS: [&str; 21] = [
    "the", "and", "for", "are", "with", "that", "this", "from", "was", "were", "which", "has",
    "have", "had", "not", "but", "they", "his", "her", "she", "him",
];

/// Common English words left out of the word cloud whatever the title
/// stopword set is (the `wordcloud` package's built-in list).
pub const CLOUD_STOPWORDS: [&str; 192] = [
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "can't", "cannot", "com", "could", "couldn't", "did", "didn't",
    "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "else", "ever", "few",
    "for", "from", "further", "get", "had", "hadn't", "has", "hasn't", "have", "haven't",
    "having", "he", "he'd", "he'll", "he's", "hence", "her", "here", "here's", "hers", "herself",
    "him", "himself", "his", "how", "how's", "however", "http", "i", "i'd", "i'll", "i'm", "i've",
    "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just", "k", "let's",
    "like", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of", "off",
    "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours", "ourselves", "out",
    "over", "own", "r", "same", "shall", "shan't", "she", "she'd", "she'll", "she's", "should",
    "shouldn't", "since", "so", "some", "such", "than", "that", "that's", "the", "their",
    "theirs", "them", "themselves", "then", "there", "there's", "therefore", "these", "they",
    "they'd", "they'll", "they're", "they've", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "wasn't", "we", "we'd", "we'll", "we're", "we've", "were",
    "weren't", "what", "what's", "when", "when's", "where", "where's", "which", "while", "who",
    "who's", "whom", "why", "why's", "with", "won't", "would", "wouldn't", "www", "you", "you'd",
    "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

static CLOUD_SET: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| CLOUD_STOPWORDS.into_iter().collect());

pub fn is_cloud_stopword(word: &str) -> bool {
    CLOUD_SET.contains(word)
}

/// Where a stopword set came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StopwordSource {
    LocalFile(PathBuf),
    Default,
}

impl std::fmt::Display for StopwordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopwordSource::LocalFile(p) => write!(f, "{}", p.display()),
            StopwordSource::Default => write!(f, "built-in default set"),
        }
    }
}

/// A set of lowercase stopwords.
#[derive(Debug, Clone)]
pub struct Stopwords {
    words: FxHashSet<String>,
    source: StopwordSource,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self {
            words: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            source: StopwordSource::Default,
        }
    }
}

impl Stopwords {
    /// Parse a word list: first comma-separated field of each line, trimmed
    /// and lower-cased. Blank lines are skipped.
    pub fn parse(text: &str, source: StopwordSource) -> Self {
        let words = text
            .lines()
            .filter_map(|line| line.split(',').next())
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words, source }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn source(&self) -> &StopwordSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Load stopwords from `path` if it exists, else fall back to
/// [`DEFAULT_STOPWORDS`]. An existing file that cannot be read is an error.
pub fn load_stopwords(path: &Path) -> Result<Stopwords> {
    if path.exists() {
        log::info!("Loading stopwords from local file: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading stopwords file {}", path.display()))?;
        Ok(Stopwords::parse(&text, StopwordSource::LocalFile(path.to_path_buf())))
    } else {
        log::info!("Local stopwords file not found, using minimal default stopwords set.");
        Ok(Stopwords::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fallback_when_file_absent() {
        let dir = TempDir::new().unwrap();
        let stopwords = load_stopwords(&dir.path().join("english_stopwords.txt")).unwrap();

        assert_eq!(*stopwords.source(), StopwordSource::Default);
        assert_eq!(stopwords.len(), DEFAULT_STOPWORDS.len());
        for word in DEFAULT_STOPWORDS {
            assert!(stopwords.contains(word));
        }
    }

    #[test]
    fn test_local_file_replaces_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("english_stopwords.txt");
        std::fs::write(&path, "Covid\n\n  virus \nstudy,extra\n").unwrap();

        let stopwords = load_stopwords(&path).unwrap();
        assert_eq!(*stopwords.source(), StopwordSource::LocalFile(path));
        assert_eq!(stopwords.len(), 3);
        assert!(stopwords.contains("covid"));
        assert!(stopwords.contains("virus"));
        assert!(stopwords.contains("study"));
        assert!(!stopwords.contains("the"));
    }

    #[test]
    fn test_cloud_stopwords() {
        assert!(is_cloud_stopword("during"));
        assert!(is_cloud_stopword("between"));
        assert!(!is_cloud_stopword("coronavirus"));
    }

    #[test]
    fn test_unreadable_file_is_error() {
        let dir = TempDir::new().unwrap();
        // A directory exists but cannot be read as text.
        assert!(load_stopwords(dir.path()).is_err());
    }
}
