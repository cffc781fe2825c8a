//! Site adapters: one search-and-parse procedure per retailer.

use crate::config::Config;
use crate::extract::{encode_query, normalize_query};
use crate::sites::catalog::Site;
use crate::sites::client::{FetchSettings, HttpFetcher, PageFetcher};
use crate::sites::models::{MissReason, ProductQuery, SiteOutcome};
use crate::sites::parser::{Parser, ParserSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Shared search capability of every retailer. Enables mocking for tests.
///
/// `search_product` never fails: faults come back as a miss with a reason.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Website label stamped on every result.
    fn website(&self) -> &str;

    /// Looks up one product.
    async fn search_product(&self, query: &ProductQuery) -> SiteOutcome;

    /// Releases the held browser session, if any.
    async fn release(&self);
}

/// Rule-table adapter for one of the built-in retailers.
pub struct RetailAdapter<F = HttpFetcher> {
    site: Site,
    base_url: String,
    parser: Parser,
    fetcher: F,
}

impl RetailAdapter<HttpFetcher> {
    /// Creates an adapter backed by the HTTP fetcher.
    pub fn from_config(site: Site, config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(site.website(), FetchSettings::from(config));
        Self::with_fetcher(site, config.base_url(site), ParserSettings::from(config), fetcher)
    }
}

impl<F: PageFetcher> RetailAdapter<F> {
    /// Creates an adapter with a custom fetcher and base URL (for testing).
    pub fn with_fetcher(
        site: Site,
        base_url: impl Into<String>,
        settings: ParserSettings,
        fetcher: F,
    ) -> Result<Self> {
        let parser = Parser::new(site.website(), site.rules(), settings)
            .with_context(|| format!("Failed to build parser for {}", site))?;

        Ok(Self { site, base_url: base_url.into(), parser, fetcher })
    }

    /// The retailer this adapter searches.
    pub fn site(&self) -> Site {
        self.site
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Builds the search URL for an already normalized query.
    pub fn search_url(&self, query: &str) -> String {
        let rules = self.site.rules();
        let encoded = encode_query(query, rules.encoding);
        format!("{}{}", self.base_url, rules.search_path.replace("{query}", &encoded))
    }
}

#[async_trait]
impl<F: PageFetcher> SiteAdapter for RetailAdapter<F> {
    fn website(&self) -> &str {
        self.site.website()
    }

    async fn search_product(&self, query: &ProductQuery) -> SiteOutcome {
        let website = self.site.website();
        let normalized = normalize_query(&query.name);
        let url = self.search_url(&normalized);

        debug!("[{}] Searching: {}", website, url);

        match self.fetcher.fetch(&url).await {
            Ok(Some(html)) => self.parser.parse_search(&html, &normalized),
            Ok(None) => SiteOutcome::miss(website, MissReason::EmptyPage),
            Err(e) => SiteOutcome::miss(website, e),
        }
    }

    async fn release(&self) {
        self.fetcher.release().await;
    }
}

/// Builds one HTTP-backed adapter per site, in the given order.
pub fn build_adapters(config: &Config, sites: &[Site]) -> Result<Vec<Box<dyn SiteAdapter>>> {
    sites
        .iter()
        .map(|site| {
            RetailAdapter::from_config(*site, config)
                .map(|adapter| Box::new(adapter) as Box<dyn SiteAdapter>)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::client::FetchError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Mock fetcher serving a canned page.
    struct MockFetcher {
        page: Result<Option<String>, u16>,
        urls: Mutex<Vec<String>>,
        releases: AtomicU32,
    }

    impl MockFetcher {
        fn serving(html: &str) -> Self {
            Self::with_page(Ok(Some(html.to_string())))
        }

        fn with_page(page: Result<Option<String>, u16>) -> Self {
            Self { page, urls: Mutex::new(Vec::new()), releases: AtomicU32::new(0) }
        }

        fn requested(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
            self.urls.lock().unwrap().push(url.to_string());
            self.page.clone().map_err(FetchError::Status)
        }

        async fn release(&self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn adapter(site: Site, fetcher: MockFetcher) -> RetailAdapter<MockFetcher> {
        RetailAdapter::with_fetcher(site, "https://shop.test", ParserSettings::default(), fetcher)
            .unwrap()
    }

    #[test]
    fn test_search_urls() {
        let amazon = adapter(Site::Amazon, MockFetcher::with_page(Ok(None)));
        assert_eq!(amazon.search_url("LG 65 OLED"), "https://shop.test/s?k=LG+65+OLED");

        let costco = adapter(Site::Costco, MockFetcher::with_page(Ok(None)));
        assert_eq!(
            costco.search_url("LG 65 OLED"),
            "https://shop.test/s?dept=All&keyword=LG%2065%20OLED"
        );

        let samsung = adapter(Site::Samsung, MockFetcher::with_page(Ok(None)));
        assert_eq!(
            samsung.search_url("QN65Q80D"),
            "https://shop.test/ca/search/?searchvalue=QN65Q80D"
        );
    }

    #[tokio::test]
    async fn test_query_is_normalized_before_fetch() {
        let fetcher = MockFetcher::with_page(Ok(None));
        let adapter = adapter(Site::BestBuy, fetcher);

        adapter.search_product(&ProductQuery::new("LG  65\u{201D} OLED\" TV")).await;

        assert_eq!(
            adapter.fetcher().requested(),
            vec!["https://shop.test/en-ca/search?search=LG+65+OLED+TV".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_page_is_miss() {
        let adapter = adapter(Site::Amazon, MockFetcher::with_page(Ok(None)));
        let outcome = adapter.search_product(&ProductQuery::new("LG OLED65C4PUA")).await;

        assert!(matches!(outcome.reason(), Some(MissReason::EmptyPage)));
        let result = outcome.into_result();
        // a miss keeps its site label so reports can say which site came up empty
        assert_eq!(result.website, "Amazon");
        assert!(result.title.is_empty());
        assert!(result.price.is_none());
        assert!(result.price_valid_till.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_is_miss() {
        let adapter = adapter(Site::Visions, MockFetcher::with_page(Err(500)));
        let outcome = adapter.search_product(&ProductQuery::new("SONY KD75X77L")).await;

        assert!(matches!(
            outcome.reason(),
            Some(MissReason::Fetch(FetchError::Status(500)))
        ));
    }

    #[tokio::test]
    async fn test_hit() {
        let html = r#"<div class="aisearch__item">
                <div class="aisearch-product__name">Samsung 65" Q80D QLED 4K QN65Q80DAFXZC</div>
                <div class="aisearch-product__price">$1,799.99</div>
                <div class="aisearch-product__price-save">$1,299.99</div>
            </div>"#;

        let adapter = adapter(Site::Samsung, MockFetcher::serving(html));
        let outcome = adapter.search_product(&ProductQuery::new("Samsung 65\" QLED TV - QN65Q80D")).await;

        let result = outcome.into_result();
        assert_eq!(result.website, "Samsung");
        assert_eq!(result.title, r#"Samsung 65" Q80D QLED 4K QN65Q80DAFXZC"#);
        assert_eq!(result.price, Some(1299.99));
    }

    #[tokio::test]
    async fn test_release_delegates_to_fetcher() {
        let adapter = adapter(Site::Staples, MockFetcher::with_page(Ok(None)));
        adapter.release().await;
        assert_eq!(adapter.fetcher().releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_build_adapters() {
        let mut config = Config::default();
        config.sites.insert(Site::Costco, "http://localhost:1234/".to_string());

        let adapters = build_adapters(&config, &[Site::Costco, Site::Amazon]).unwrap();
        let labels: Vec<_> = adapters.iter().map(|a| a.website()).collect();
        assert_eq!(labels, vec!["Costco", "Amazon"]);

        let costco = RetailAdapter::from_config(Site::Costco, &config).unwrap();
        assert!(costco.search_url("x").starts_with("http://localhost:1234/s?"));
    }
}
