//! shelf-scout - Multi-retailer product price lookup
//!
//! Searches several retail sites for each product in a query list, keeps
//! the first listing that matches the query, and groups the hits by brand.

pub mod commands;
pub mod config;
pub mod engine;
pub mod extract;
pub mod format;
pub mod sites;

pub use config::Config;
pub use engine::{BrandGroup, Orchestrator, QueryOutcome, Reconciler};
pub use sites::{ProductQuery, ScrapeResult, Site, SiteAdapter, SiteOutcome};
