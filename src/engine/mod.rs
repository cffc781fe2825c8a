//! Run engine: fans queries out to site adapters and reconciles the hits
//! into brand groups.

pub mod brands;
pub mod models;
pub mod orchestrator;
pub mod reconcile;

pub use brands::{BrandCatalog, DEFAULT_BRANDS, UNKNOWN_BRAND};
pub use models::{BrandGroup, QueryOutcome};
pub use orchestrator::Orchestrator;
pub use reconcile::{BrandOrder, Reconciler};
