//! Money parsing for free-text price nodes.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Decimal money amount, optionally prefixed with a dollar sign.
static MONEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$?[\d,]+\.\d+").unwrap());

/// Extracts the first decimal money amount from `text`.
///
/// Thousands separators and the currency symbol are stripped. Only finite,
/// non-negative values are returned.
pub fn parse_money(text: &str) -> Option<f64> {
    let found = MONEY.find(text)?;
    let cleaned: String = found.as_str().chars().filter(|c| *c != '$' && *c != ',').collect();
    checked(cleaned.parse().ok()?)
}

/// Parses a machine-readable amount such as a `content="1299"` attribute.
///
/// Falls back to a bare number when no decimal money pattern is present.
pub fn parse_amount(text: &str) -> Option<f64> {
    if let Some(value) = parse_money(text) {
        return Some(value);
    }

    let cleaned: String =
        text.trim().chars().filter(|c| *c != '$' && *c != ',').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    checked(cleaned.parse().ok()?)
}

fn checked(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}
