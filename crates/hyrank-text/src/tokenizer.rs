use std::collections::HashMap;

/// Terms this short carry too little signal to index.
pub const MIN_TERM_CHARS: usize = 3;

/// Splits text into index terms.
///
/// Lower-cases, drops every character that is neither alphanumeric nor
/// whitespace, splits on whitespace and keeps terms of at least
/// [`MIN_TERM_CHARS`] characters, in source order. Indexing and query scoring
/// both go through here so their vocabularies match exactly.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    cleaned
        .split_whitespace()
        .filter(|term| term.chars().count() >= MIN_TERM_CHARS)
        .map(str::to_string)
        .collect()
}

/// Raw frequency of each term in `text`.
pub fn term_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in tokenize(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}
