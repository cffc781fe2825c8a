//! Promotional "offer ends" / "valid until" extraction near a price.

use super::collapse_whitespace;
use regex_lite::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

static TEXT_NODES: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span, div").unwrap());

static PROMO_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)offer\s+ends|sale\s+ends|valid\s+until|expires").unwrap()
});

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\w+ \d{1,2},? \d{4}").unwrap()
});

static PROMO_CLASSES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".promotion, .deal-end, .offer-expires, .sale-end-date, .promo-end").unwrap()
});

static PROMO_IDS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#offerEnd, #dealExpiry, #saleEnd, #promotionEnd").unwrap()
});

fn has_promo_text(element: &ElementRef) -> bool {
    PROMO_TEXT.is_match(&element.text().collect::<String>())
}

/// Finds a price-validity hint inside `scope`.
///
/// Tries promotional wording first (returning the date it mentions, or the
/// whole phrase), then dedicated validity elements. Empty when nothing is found.
pub fn price_valid_till(scope: ElementRef) -> String {
    let innermost = scope.select(&TEXT_NODES).find(|element| {
        has_promo_text(element) && !element.select(&TEXT_NODES).any(|inner| has_promo_text(&inner))
    });

    if let Some(element) = innermost {
        let text = collapse_whitespace(&element.text().collect::<String>());
        return match DATE.find(&text) {
            Some(date) => date.as_str().to_string(),
            None => text,
        };
    }

    [&*PROMO_CLASSES, &*PROMO_IDS]
        .into_iter()
        .find_map(|selector| scope.select(selector).next())
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn scan(html: &str) -> String {
        let document = Html::parse_fragment(html);
        price_valid_till(document.root_element())
    }

    #[test]
    fn test_numeric_date() {
        assert_eq!(scan(r#"<div><span>Offer ends 12/31/2024</span></div>"#), "12/31/2024");
    }

    #[test]
    fn test_written_date() {
        assert_eq!(
            scan(r#"<div class="card"><div><span>Sale ends Dec 1, 2024</span></div></div>"#),
            "Dec 1, 2024"
        );
    }

    #[test]
    fn test_phrase_without_date() {
        assert_eq!(scan(r#"<div><span>  Offer   ends soon </span></div>"#), "Offer ends soon");
    }

    #[test]
    fn test_innermost_element_wins() {
        let html = r#"<div><div>$499.99 <span>Valid until 1/15/25</span></div></div>"#;
        assert_eq!(scan(html), "1/15/25");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(scan(r#"<span>EXPIRES 03-04-2025</span>"#), "03-04-2025");
    }

    #[test]
    fn test_promo_class() {
        assert_eq!(scan(r#"<p class="deal-end">Ends Sunday</p>"#), "Ends Sunday");
    }

    #[test]
    fn test_promo_id() {
        assert_eq!(scan(r#"<p id="saleEnd">This weekend only</p>"#), "This weekend only");
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(scan(r#"<div><span>$499.99</span></div>"#), "");
    }
}
