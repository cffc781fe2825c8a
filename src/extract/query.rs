//! Query text normalization and per-site URL encoding.

use super::collapse_whitespace;
use serde::{Deserialize, Serialize};

/// Quotation characters removed from queries before searching.
const QUOTES: &[char] = &['"', '\u{201C}', '\u{201D}', '\u{2033}'];

/// How a site expects the search terms to be encoded in its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryEncoding {
    /// Form-style encoding, spaces become `+`.
    Plus,
    /// Path-style encoding, spaces become `%20`.
    Percent,
}

/// Strips quotation characters and collapses whitespace.
pub fn normalize_query(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !QUOTES.contains(c)).collect();
    collapse_whitespace(&stripped)
}

/// Encodes already-normalized query text for insertion into a search URL.
pub fn encode_query(text: &str, encoding: QueryEncoding) -> String {
    let encoded = urlencoding::encode(text);
    match encoding {
        QueryEncoding::Plus => encoded.replace("%20", "+"),
        QueryEncoding::Percent => encoded.into_owned(),
    }
}
