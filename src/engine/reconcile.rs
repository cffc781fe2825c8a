//! Brand reconciliation: turns per-query hits into per-brand groups.

use crate::config::Config;
use crate::engine::brands::{BrandCatalog, UNKNOWN_BRAND};
use crate::engine::models::{BrandGroup, QueryOutcome};
use crate::sites::{ScrapeResult, Site};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Ordering of brand groups in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandOrder {
    /// Order in which each brand first received a hit
    #[default]
    FirstSeen,
    /// Case-insensitive by brand name
    Alphabetical,
}

/// Assigns every hit to exactly one brand, or drops it.
///
/// Precedence: single-brand storefront, then the title, then the query's
/// brand guess. Anything else is unattributable.
#[derive(Debug, Clone)]
pub struct Reconciler {
    brands: BrandCatalog,
    overrides: HashMap<String, String>,
    order: BrandOrder,
    keep_unattributed: bool,
}

impl Reconciler {
    /// Creates a reconciler with the built-in storefront overrides.
    pub fn new(brands: BrandCatalog) -> Self {
        let overrides = Site::all()
            .iter()
            .filter_map(|site| Some((site.website().to_string(), site.brand_override()?.to_string())))
            .collect();

        Self { brands, overrides, order: BrandOrder::default(), keep_unattributed: false }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut reconciler = Self::new(BrandCatalog::new(config.brands.iter().cloned()))
            .with_order(config.brand_order)
            .keep_unattributed(config.keep_unattributed);

        for (website, brand) in &config.brand_overrides {
            reconciler = reconciler.with_override(website.clone(), brand.clone());
        }

        reconciler
    }

    /// Forces every hit from `website` under `brand`.
    pub fn with_override(mut self, website: impl Into<String>, brand: impl Into<String>) -> Self {
        self.overrides.insert(website.into(), brand.into());
        self
    }

    pub fn with_order(mut self, order: BrandOrder) -> Self {
        self.order = order;
        self
    }

    /// Reports unattributable hits under "Unknown" instead of dropping them.
    pub fn keep_unattributed(mut self, keep: bool) -> Self {
        self.keep_unattributed = keep;
        self
    }

    /// Resolves the brand of one hit, or `None` when it can't be attributed.
    pub fn resolve_brand(&self, hit: &ScrapeResult, query_brand: &str) -> Option<String> {
        if let Some(brand) = self.overrides.get(&hit.website) {
            return Some(brand.clone());
        }

        if let Some(brand) = self.brands.detect(&hit.title) {
            return Some(brand.to_string());
        }

        (query_brand != UNKNOWN_BRAND && !query_brand.is_empty()).then(|| query_brand.to_string())
    }

    /// Groups all hits by brand. Brands without hits never appear.
    pub fn merge(&self, outcomes: Vec<QueryOutcome>) -> Vec<BrandGroup> {
        let mut groups: Vec<BrandGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut unattributed = Vec::new();

        for outcome in outcomes {
            for hit in outcome.hits {
                let Some(brand) = self.resolve_brand(&hit, &outcome.query_brand) else {
                    debug!("[{}] No brand for '{}' (query: '{}')", hit.website, hit.title, outcome.query);
                    unattributed.push(hit);
                    continue;
                };

                debug!("[{}] '{}' -> {}", hit.website, hit.title, brand);

                match index.get(&brand) {
                    Some(&i) => groups[i].products.push(hit),
                    None => {
                        index.insert(brand.clone(), groups.len());
                        groups.push(BrandGroup { brand, products: vec![hit] });
                    }
                }
            }
        }

        if self.order == BrandOrder::Alphabetical {
            groups.sort_by_key(|group| group.brand.to_lowercase());
        }

        if self.keep_unattributed && !unattributed.is_empty() {
            groups.push(BrandGroup { brand: UNKNOWN_BRAND.to_string(), products: unattributed });
        } else if !unattributed.is_empty() {
            debug!("Dropped {} unattributable hits", unattributed.len());
        }

        groups
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(BrandCatalog::default())
    }
}
