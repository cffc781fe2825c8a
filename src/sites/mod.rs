//! Retail sites: catalog, extraction rules, page fetching, and adapters.

pub mod adapter;
pub mod catalog;
pub mod client;
pub mod models;
pub mod parser;
pub mod selectors;

pub use adapter::{build_adapters, RetailAdapter, SiteAdapter};
pub use catalog::{Site, SiteParseError};
pub use client::{FetchError, FetchSettings, HttpFetcher, PageFetcher};
pub use models::{CandidateStats, MissReason, ProductQuery, ScrapeResult, SiteOutcome};
pub use parser::{Parser, ParserSettings};
pub use selectors::{PriceSource, SiteRules};
