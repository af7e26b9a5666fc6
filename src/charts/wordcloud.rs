//! Word Frequency Module
//! Token counts for the fine-description word cloud.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WordCloudError {
    #[error("No fine descriptions to summarise")]
    EmptyText,
}

/// Common English words that carry no meaning in a cloud.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "else",
    "ever", "few", "for", "from", "further", "get", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my", "myself", "no",
    "nor", "not", "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought", "our",
    "ours", "ourselves", "out", "over", "own", "same", "shall", "she", "should", "since", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// A word and its weight relative to the most frequent word (0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct WordWeight {
    pub word: String,
    pub count: usize,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordFrequencies {
    pub words: Vec<WordWeight>,
}

impl WordFrequencies {
    /// Count words in `text`, keeping the `max_words` most frequent.
    pub fn from_text(text: &str, max_words: usize) -> Result<Self, WordCloudError> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for token in tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        merge_plurals(&mut counts);
        if counts.is_empty() {
            return Err(WordCloudError::EmptyText);
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_words.max(1));

        let top = ranked[0].1 as f32;
        let words = ranked
            .into_iter()
            .map(|(word, count)| WordWeight {
                weight: count as f32 / top,
                word,
                count,
            })
            .collect();

        Ok(Self { words })
    }
}

/// Lower-cased words of two or more characters, stop words and numbers removed.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '_'))
        .map(|raw| raw.trim_matches('\'').to_lowercase())
        .map(|word| match word.strip_suffix("'s") {
            Some(stem) => stem.to_string(),
            None => word,
        })
        .filter(|word| word.chars().count() >= 2)
        .filter(|word| !word.chars().all(|c| c.is_numeric()))
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
}

/// Fold "fines" into "fine" when both forms occur. Words ending in "ss" are left alone.
fn merge_plurals(counts: &mut HashMap<String, usize>) {
    let plurals: Vec<String> = counts
        .keys()
        .filter(|word| word.ends_with('s') && !word.ends_with("ss"))
        .cloned()
        .collect();

    for plural in plurals {
        let singular = &plural[..plural.len() - 1];
        if !counts.contains_key(singular) {
            continue;
        }
        if let Some(count) = counts.remove(&plural) {
            *counts.entry(singular.to_string()).or_insert(0) += count;
        }
    }
}
