//! Extraction rule tables for every supported retailer.
//!
//! Each list is ordered: the first selector that matches wins and later
//! entries are fallbacks for older or alternate markup. Retail sites change
//! their HTML often; when a site stops producing hits, capture a page sample,
//! add a selector here, and add a fixture test.

use crate::extract::QueryEncoding;

/// Where a price is read from inside a result item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// Text content of every element matching the selector, in order.
    Text(&'static str),
    /// An attribute holding a machine-readable amount, optionally falling
    /// back to the element's text when the attribute is missing or empty.
    Attr { selector: &'static str, attr: &'static str, text_fallback: bool },
}

impl PriceSource {
    /// The CSS selector this source reads from.
    pub fn selector(&self) -> &'static str {
        match self {
            PriceSource::Text(selector) => selector,
            PriceSource::Attr { selector, .. } => selector,
        }
    }
}

/// Site-specific search procedure, consumed by the generic rule parser.
#[derive(Debug, Clone, Copy)]
pub struct SiteRules {
    /// Path and query appended to the base URL; `{query}` is replaced.
    pub search_path: &'static str,
    pub encoding: QueryEncoding,
    /// Candidate selectors for the result items.
    pub containers: &'static [&'static str],
    /// Marker for sponsored placements inside an item.
    pub sponsored: Option<&'static str>,
    pub titles: &'static [&'static str],
    pub prices: &'static [PriceSource],
    /// Only the first result tile is considered.
    pub single_result: bool,
    /// Candidate titles must pass the similarity check.
    pub match_gate: bool,
    /// A title without a price is not a hit.
    pub require_price: bool,
    /// Look for "offer ends" text in the accepted item.
    pub scan_validity: bool,
}

pub static AMAZON: SiteRules = SiteRules {
    search_path: "/s?k={query}",
    encoding: QueryEncoding::Plus,
    containers: &["[data-component-type='s-search-result']", ".s-result-item", ".sg-col-inner"],
    sponsored: Some(".s-sponsored-label-info-icon"),
    titles: &["h2 .a-link-normal", "h2 span", ".a-text-normal", ".a-size-base-plus"],
    prices: &[
        PriceSource::Text(".a-price .a-offscreen"),
        PriceSource::Text(".a-price"),
        PriceSource::Text(".a-color-price"),
    ],
    single_result: false,
    match_gate: true,
    require_price: true,
    scan_validity: false,
};

pub static BESTBUY: SiteRules = SiteRules {
    search_path: "/en-ca/search?search={query}",
    encoding: QueryEncoding::Plus,
    containers: &["li.productLine_2N9kG", "div[role='region'] li", ".productList li"],
    sponsored: Some("[data-automation='sponsored-label']"),
    titles: &["h3.productItemName_3IZ3c", "[itemprop='name']"],
    prices: &[PriceSource::Text("div[data-automation='product-price']")],
    single_result: false,
    match_gate: true,
    require_price: true,
    scan_validity: true,
};

pub static COSTCO: SiteRules = SiteRules {
    search_path: "/s?dept=All&keyword={query}",
    encoding: QueryEncoding::Percent,
    containers: &["div[data-testid^='ProductTile_']", "div.product-tile-set"],
    sponsored: None,
    titles: &["h3[data-testid^='Text_ProductTile_']", "span.description"],
    prices: &[
        PriceSource::Text("div[data-testid^='Text_Price_']"),
        PriceSource::Text("div.price"),
    ],
    single_result: true,
    match_gate: false,
    require_price: false,
    scan_validity: false,
};

pub static STAPLES: SiteRules = SiteRules {
    search_path: "/search?query={query}",
    encoding: QueryEncoding::Plus,
    containers: &[".product-thumbnail.h-100.ais-hit"],
    sponsored: None,
    titles: &[".product-thumbnail__title.product-link"],
    prices: &[PriceSource::Text(".money.pre-money")],
    single_result: true,
    match_gate: false,
    require_price: false,
    scan_validity: false,
};

pub static VISIONS: SiteRules = SiteRules {
    search_path: "/catalogsearch/result?q={query}",
    encoding: QueryEncoding::Plus,
    containers: &[".ais-Hits-item"],
    sponsored: None,
    titles: &["h3.result-title"],
    prices: &[
        PriceSource::Attr { selector: "meta[itemprop='price']", attr: "content", text_fallback: false },
        PriceSource::Attr {
            selector: ".after-special.special-price .price-wrapper",
            attr: "data-price-amount",
            text_fallback: true,
        },
        PriceSource::Attr { selector: ".price-wrapper", attr: "data-price-amount", text_fallback: true },
    ],
    single_result: false,
    match_gate: true,
    require_price: true,
    scan_validity: true,
};

pub static LONDON_DRUGS: SiteRules = SiteRules {
    search_path: "/search?q={query}",
    encoding: QueryEncoding::Plus,
    containers: &["section.product-card", "div.grid section", ".product-listing div"],
    sponsored: None,
    titles: &["h3.product-name", ".product-name", "h3", "[class*='title']"],
    prices: &[
        PriceSource::Text("section.product-card-price small"),
        PriceSource::Text(".price"),
        PriceSource::Text("[class*='price']"),
    ],
    single_result: false,
    match_gate: true,
    require_price: true,
    scan_validity: true,
};

pub static SAMSUNG: SiteRules = SiteRules {
    search_path: "/ca/search/?searchvalue={query}",
    encoding: QueryEncoding::Plus,
    containers: &[".aisearch__item"],
    sponsored: None,
    titles: &[".aisearch-product__name"],
    prices: &[
        PriceSource::Text(".aisearch-product__price-save"),
        PriceSource::Text(".aisearch-product__price"),
    ],
    single_result: false,
    match_gate: true,
    require_price: true,
    scan_validity: true,
};

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn all() -> [&'static SiteRules; 7] {
        [&AMAZON, &BESTBUY, &COSTCO, &STAPLES, &VISIONS, &LONDON_DRUGS, &SAMSUNG]
    }

    #[test]
    fn test_selectors_compile() {
        for rules in all() {
            let selectors = rules
                .containers
                .iter()
                .chain(rules.titles.iter())
                .chain(rules.sponsored.iter())
                .copied()
                .chain(rules.prices.iter().map(PriceSource::selector));

            for raw in selectors {
                assert!(Selector::parse(raw).is_ok(), "invalid selector: {raw}");
            }
        }
    }

    #[test]
    fn test_every_site_has_fallbacks_in_order() {
        for rules in all() {
            assert!(!rules.containers.is_empty());
            assert!(!rules.titles.is_empty());
            assert!(!rules.prices.is_empty());
            assert!(rules.search_path.contains("{query}"));
        }
    }

    #[test]
    fn test_single_result_sites_skip_gate() {
        for rules in all() {
            if rules.single_result {
                assert!(!rules.match_gate);
            } else {
                assert!(rules.match_gate, "multi-result pages must gate titles");
            }
        }
    }

    #[test]
    fn test_basic_selector_matching() {
        let html = Html::parse_document(
            r#"<div data-component-type="s-search-result" data-asin="B123">
                <h2><a class="a-link-normal" href="/dp/B123"><span>Test Product</span></a></h2>
            </div>"#,
        );

        let selector = Selector::parse(AMAZON.containers[0]).unwrap();
        assert_eq!(html.select(&selector).count(), 1);
    }
}
