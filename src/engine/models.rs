//! Per-query and per-brand result collections.

use crate::sites::ScrapeResult;
use serde::{Deserialize, Serialize};

/// Hits collected for one query across every site.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    /// Query text as given
    pub query: String,
    /// Brand guessed from the query text, or "Unknown"
    pub query_brand: String,
    /// Accepted results, in adapter order; misses are never kept
    pub hits: Vec<ScrapeResult>,
}

/// One brand's section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BrandGroup {
    pub brand: String,
    pub products: Vec<ScrapeResult>,
}
