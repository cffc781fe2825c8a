//! Title similarity used by the match gate to reject off-target search hits.

use std::collections::HashSet;

/// Minimum token similarity for a candidate title to pass the match gate.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.3;

/// Lowercased alphanumeric tokens of `text`.
pub fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard similarity of the token sets of `a` and `b`, in `[0, 1]`.
///
/// Returns `0.0` when neither text has any tokens.
pub fn similarity(a: &str, b: &str) -> f64 {
    let left = tokens(a);
    let right = tokens(b);

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }

    let shared = left.intersection(&right).count();
    shared as f64 / union as f64
}

/// Model-number-like tokens: at least 5 characters mixing letters and digits,
/// normalized to uppercase.
pub fn model_codes(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| t.len() >= 5)
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
        .filter(|t| t.chars().any(|c| c.is_ascii_alphabetic()))
        .map(str::to_ascii_uppercase)
        .collect()
}

/// Uppercase alphanumerics only, so "QN65-Q80D" and "qn65q80d" compare equal.
fn squash(text: &str) -> String {
    text.chars().filter(char::is_ascii_alphanumeric).map(|c| c.to_ascii_uppercase()).collect()
}

/// Match gate: the title carries one of the query's model codes, or the two
/// texts reach `threshold` similarity.
pub fn is_match(query: &str, title: &str, threshold: f64) -> bool {
    let squashed_title = squash(title);
    if model_codes(query).iter().any(|code| squashed_title.contains(code.as_str())) {
        return true;
    }

    similarity(query, title) >= threshold
}
