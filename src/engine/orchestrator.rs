//! Concurrent fan-out of queries across site adapters.

use crate::engine::brands::BrandCatalog;
use crate::engine::models::QueryOutcome;
use crate::sites::{ProductQuery, SiteAdapter, SiteOutcome};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, info, warn};

/// Runs every query against every adapter and collects the hits.
pub struct Orchestrator {
    adapters: Vec<Box<dyn SiteAdapter>>,
    brands: BrandCatalog,
}

impl Orchestrator {
    pub fn new(adapters: Vec<Box<dyn SiteAdapter>>, brands: BrandCatalog) -> Self {
        Self { adapters, brands }
    }

    pub fn adapters(&self) -> &[Box<dyn SiteAdapter>] {
        &self.adapters
    }

    /// Searches all sites concurrently for one query.
    ///
    /// A failing or panicking adapter only loses its own result.
    pub async fn process_query(&self, query: &ProductQuery) -> QueryOutcome {
        let query_brand = self.brands.guess_query_brand(&query.name);
        info!("Searching {} sites for '{}' (brand: {})", self.adapters.len(), query.name, query_brand);

        let searches = self.adapters.iter().map(|adapter| search_isolated(adapter.as_ref(), query));
        let outcomes = join_all(searches).await;

        let hits: Vec<_> = outcomes
            .into_iter()
            .flatten()
            .filter_map(|outcome| match outcome {
                SiteOutcome::Hit(result) if !result.is_miss() => {
                    info!("[{}] Found: {} ({:?})", result.website, result.title, result.price);
                    Some(result)
                }
                SiteOutcome::Hit(_) => None,
                SiteOutcome::Miss { website, reason } if reason.is_fault() => {
                    warn!("[{}] Fetch failed for '{}': {}", website, query.name, reason);
                    None
                }
                SiteOutcome::Miss { website, reason } => {
                    debug!("[{}] No match for '{}': {}", website, query.name, reason);
                    None
                }
            })
            .collect();

        info!("'{}': {} of {} sites matched", query.name, hits.len(), self.adapters.len());

        QueryOutcome { query: query.name.clone(), query_brand, hits }
    }

    /// Processes all queries concurrently, then releases every session once.
    ///
    /// Outcomes are returned in query order.
    pub async fn process_all(&self, queries: &[ProductQuery]) -> Vec<QueryOutcome> {
        let outcomes = join_all(queries.iter().map(|query| self.process_query(query))).await;
        self.release_all().await;
        outcomes
    }

    /// Releases every adapter's session.
    pub async fn release_all(&self) {
        debug!("Releasing {} adapter sessions", self.adapters.len());
        join_all(self.adapters.iter().map(|adapter| adapter.release())).await;
    }
}

/// Runs one adapter search, turning a panic into `None`.
async fn search_isolated(adapter: &dyn SiteAdapter, query: &ProductQuery) -> Option<SiteOutcome> {
    match AssertUnwindSafe(adapter.search_product(query)).catch_unwind().await {
        Ok(outcome) => Some(outcome),
        Err(panic) => {
            warn!("[{}] Adapter failed on '{}': {}", adapter.website(), query.name, panic_message(&*panic));
            None
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
