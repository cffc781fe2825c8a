//! Site-independent helpers shared by every adapter: query normalization,
//! title matching, money parsing and price-validity scanning.

pub mod price;
pub mod query;
pub mod similarity;
pub mod validity;

pub use price::{parse_amount, parse_money};
pub use query::{encode_query, normalize_query, QueryEncoding};
pub use similarity::{is_match, model_codes, similarity, tokens, DEFAULT_MATCH_THRESHOLD};
pub use validity::price_valid_till;

/// Collapses all whitespace runs in `text` to single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
