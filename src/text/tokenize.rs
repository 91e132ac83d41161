use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use super::stopwords::{is_cloud_stopword, Stopwords};
use crate::data::aggregate::sort_counts;
use crate::data::model::Column;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Minimum kept word length, exclusive.
const MIN_WORD_CHARS: usize = 2;

/// Lower-case `text`, split on word boundaries, and keep words longer than
/// two characters that are not stopwords.
pub fn tokenize(text: &str, stopwords: &Stopwords) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > MIN_WORD_CHARS && !stopwords.contains(w))
        .map(str::to_string)
        .collect()
}

/// Bigrams scoring above this are counted as one term.
const COLLOCATION_THRESHOLD: f64 = 30.0;

/// Word-cloud frequencies over all non-null titles, most frequent first.
///
/// The tokens of every title form one stream, as if the titles were joined
/// into a single text, and are weighted by [`cloud_frequencies`].
pub fn word_frequencies(titles: &Column, stopwords: &Stopwords) -> Vec<(String, usize)> {
    let tokens: Vec<String> = titles
        .values
        .iter()
        .filter(|v| !v.is_null())
        .flat_map(|title| tokenize(&title.to_string(), stopwords))
        .collect();
    cloud_frequencies(&tokens)
}

/// Weight a token stream the way the word cloud does:
///
/// * numeric tokens and [`is_cloud_stopword`] words are dropped;
/// * `words` is folded into `word` when both occur (not `ss` endings);
/// * adjacent pairs whose Dunning log-likelihood score exceeds
///   [`COLLOCATION_THRESHOLD`] become one `"first second"` term, and their
///   count is taken off both single words. Words left at zero disappear.
pub fn cloud_frequencies(tokens: &[String]) -> Vec<(String, usize)> {
    let words: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|w| !w.chars().all(char::is_numeric))
        .collect();
    // Pairs are taken before stopwords are removed, so no bigram spans one.
    let bigrams: Vec<String> = words
        .windows(2)
        .filter(|pair| !pair.iter().any(|w| is_cloud_stopword(w)))
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect();
    let unigrams: Vec<&str> = words.iter().copied().filter(|w| !is_cloud_stopword(w)).collect();
    let n_words = unigrams.len();

    let (mut counts, singular) = fold_plurals(count(unigrams));
    let (bigram_counts, _) = fold_plurals(count(bigrams.iter().map(String::as_str)));
    let single = counts.clone();
    let standard = |w: &str| singular.get(w).cloned().unwrap_or_else(|| w.to_string());

    for (bigram, &n) in &bigram_counts {
        let Some((first, second)) = bigram.split_once(' ') else {
            continue;
        };
        let (first, second) = (standard(first), standard(second));
        let c1 = single.get(&first).copied().unwrap_or(0);
        let c2 = single.get(&second).copied().unwrap_or(0);
        if collocation_score(n, c1, c2, n_words) > COLLOCATION_THRESHOLD {
            *counts.entry(first).or_default() -= n;
            *counts.entry(second).or_default() -= n;
            counts.insert(bigram.clone(), n);
        }
    }

    sort_counts(
        counts
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(w, n)| (w, n as usize))
            .collect(),
    )
}

fn count<'a>(words: impl IntoIterator<Item = &'a str>) -> FxHashMap<String, i64> {
    let mut counts: FxHashMap<String, i64> = FxHashMap::default();
    for word in words {
        *counts.entry(word.to_string()).or_default() += 1;
    }
    counts
}

/// Merge `words` into `word` when both occur. `ss` endings are left alone
/// (`virus`, `class`, `illness`). Also returns the plural → singular map.
fn fold_plurals(
    mut counts: FxHashMap<String, i64>,
) -> (FxHashMap<String, i64>, FxHashMap<String, String>) {
    let plurals: Vec<String> = counts
        .keys()
        .filter(|w| w.ends_with('s') && !w.ends_with("ss"))
        .filter(|w| counts.contains_key(&w[..w.len() - 1]))
        .cloned()
        .collect();
    let mut singular = FxHashMap::default();
    for plural in plurals {
        if let Some(n) = counts.remove(&plural) {
            let word = plural[..plural.len() - 1].to_string();
            *counts.entry(word.clone()).or_default() += n;
            singular.insert(plural, word);
        }
    }
    (counts, singular)
}

fn log_likelihood(k: f64, n: f64, x: f64) -> f64 {
    x.max(1e-10).ln() * k + (1.0 - x).max(1e-10).ln() * (n - k)
}

/// Dunning's likelihood-ratio score of a bigram seen `pair` times whose
/// words occur `c1` and `c2` times among `n_words`.
fn collocation_score(pair: i64, c1: i64, c2: i64, n_words: usize) -> f64 {
    let n = n_words as f64;
    let (c12, c1, c2) = (pair as f64, c1 as f64, c2 as f64);
    if c1 <= 0.0 || n <= c1 || n <= c2 {
        return 0.0;
    }
    let p = c2 / n;
    let p1 = c12 / c1;
    let p2 = (c2 - c12) / (n - c1);
    -2.0 * (log_likelihood(c12, c1, p) + log_likelihood(c2 - c12, n - c1, p)
        - log_likelihood(c12, c1, p1)
        - log_likelihood(c2 - c12, n - c1, p2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    #[test]
    fn test_tokenize_filters() {
        let stopwords = Stopwords::default();
        let tokens = tokenize("The SARS-CoV-2 spike and an ACE2 receptor: a study", &stopwords);
        assert_eq!(tokens, vec!["sars", "cov", "spike", "ace2", "receptor", "study"]);
    }

    #[test]
    fn test_tokenize_counts_unicode_chars() {
        let stopwords = Stopwords::default();
        // "ïd" is two characters even though it is three bytes.
        assert_eq!(tokenize("ïd étude", &stopwords), vec!["étude"]);
    }

    fn title_column(titles: &[&str]) -> Column {
        Column::new(
            "title",
            titles.iter().map(|t| CellValue::String(t.to_string())).collect(),
        )
    }

    #[test]
    fn test_numbers_and_common_words_left_out() {
        let titles = title_column(&[
            "2019-nCoV outbreak during 2019",
            "Clinical features of 2019 novel coronavirus",
        ]);
        let freqs = word_frequencies(&titles, &Stopwords::default());
        let words: Vec<&str> = freqs.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(
            words,
            vec!["clinical", "coronavirus", "features", "ncov", "novel", "outbreak"]
        );
    }

    #[test]
    fn test_strong_bigram_becomes_one_term() {
        let topics = [
            "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india",
            "juliet",
        ];
        let titles: Vec<String> = topics.iter().map(|t| format!("Public health {t}")).collect();
        let titles: Vec<&str> = titles.iter().map(String::as_str).collect();

        let freqs = word_frequencies(&title_column(&titles), &Stopwords::default());
        assert_eq!(freqs[0], ("public health".to_string(), 10));
        assert_eq!(freqs.len(), 11);
        assert!(freqs.iter().all(|(w, _)| w != "public" && w != "health"));
    }

    #[test]
    fn test_collocation_score() {
        assert!((collocation_score(10, 10, 10, 30) - 38.1909).abs() < 1e-3);
        assert!((collocation_score(1, 1, 1, 6) - 5.4067).abs() < 1e-3);
        assert_eq!(collocation_score(1, 6, 1, 6), 0.0);
    }

    #[test]
    fn test_word_frequencies_fold_plurals() {
        let titles = Column::new(
            "title",
            vec![
                CellValue::String("Vaccine trials".into()),
                CellValue::String("A vaccine trial for the virus".into()),
                CellValue::Null,
                CellValue::String("Vaccines".into()),
                CellValue::String("Outcomes".into()),
            ],
        );
        let freqs = word_frequencies(&titles, &Stopwords::default());
        assert_eq!(
            freqs,
            vec![
                ("vaccine".to_string(), 3),
                ("trial".to_string(), 2),
                ("outcomes".to_string(), 1),
                ("virus".to_string(), 1),
            ]
        );
    }
}
