//! Scan command: every query against every enabled site, grouped by brand.

use crate::config::Config;
use crate::engine::{BrandCatalog, BrandGroup, Orchestrator, Reconciler};
use crate::format::Formatter;
use crate::sites::{build_adapters, ProductQuery, SiteAdapter};
use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of a scan: the rendered report and where the JSON copy went.
#[derive(Debug)]
pub struct ScanOutput {
    pub rendered: String,
    pub report_path: Option<PathBuf>,
    pub groups: Vec<BrandGroup>,
}

/// Runs a full scan over a query list.
pub struct ScanCommand {
    config: Config,
    write: bool,
}

impl ScanCommand {
    /// Creates a new scan command that writes its report to disk.
    pub fn new(config: Config) -> Self {
        Self { config, write: true }
    }

    /// Enables or disables writing the timestamped report file.
    pub fn write_report(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Loads queries from `queries_path` and scans the enabled sites.
    pub async fn execute(&self, queries_path: &Path) -> Result<ScanOutput> {
        let queries = load_queries(queries_path)?;

        ensure!(!self.config.enabled_sites.is_empty(), "No sites enabled");
        let adapters = build_adapters(&self.config, &self.config.enabled_sites)
            .context("Failed to create site adapters")?;

        self.execute_with_adapters(adapters, &queries).await
    }

    /// Scans with provided adapters (for testing).
    pub async fn execute_with_adapters(
        &self,
        adapters: Vec<Box<dyn SiteAdapter>>,
        queries: &[ProductQuery],
    ) -> Result<ScanOutput> {
        info!("Scanning {} queries across {} sites", queries.len(), adapters.len());

        let brands = BrandCatalog::new(self.config.brands.iter().cloned());
        let orchestrator = Orchestrator::new(adapters, brands);
        let outcomes = orchestrator.process_all(queries).await;

        let groups = Reconciler::from_config(&self.config).merge(outcomes);
        let found: usize = groups.iter().map(|g| g.products.len()).sum();
        info!("Found {} products across {} brands", found, groups.len());

        let report_path = if self.write {
            let path = write_report(&self.config.output_dir, &groups, Local::now())?;
            info!("Report written to {}", path.display());
            Some(path)
        } else {
            None
        };

        let rendered = Formatter::new(self.config.format).format_report(&groups);

        Ok(ScanOutput { rendered, report_path, groups })
    }
}

/// Reads a JSON array of `{"name": ...}` objects.
pub fn load_queries(path: &Path) -> Result<Vec<ProductQuery>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read query file: {}", path.display()))?;

    parse_queries(&content).with_context(|| format!("Invalid query file: {}", path.display()))
}

pub fn parse_queries(json: &str) -> Result<Vec<ProductQuery>> {
    let queries: Vec<ProductQuery> =
        serde_json::from_str(json).context("Expected a JSON array of {\"name\": ...} objects")?;
    Ok(queries)
}

/// File name of the report written at `at`, e.g. `results_20241120_143005.json`.
pub fn report_file_name(at: DateTime<Local>) -> String {
    format!("results_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Writes the pretty-printed JSON report into `dir`, creating it if needed.
pub fn write_report(dir: &Path, groups: &[BrandGroup], at: DateTime<Local>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let path = dir.join(report_file_name(at));
    let json = serde_json::to_string_pretty(groups).context("Failed to serialize report")?;

    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    Ok(path)
}
