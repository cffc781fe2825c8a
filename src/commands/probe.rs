//! Probe command: one query against one site, reporting why it missed.

use crate::config::Config;
use crate::format::Formatter;
use crate::sites::{ProductQuery, RetailAdapter, Site, SiteAdapter, SiteOutcome};
use anyhow::{Context, Result};
use tracing::info;

/// Runs a single adapter once, for debugging selectors and matching.
pub struct ProbeCommand {
    config: Config,
}

impl ProbeCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Probes `site` for `query` and returns formatted output.
    pub async fn execute(&self, site: Site, query: &str) -> Result<String> {
        let adapter = RetailAdapter::from_config(site, &self.config)
            .with_context(|| format!("Failed to create adapter for {}", site))?;

        self.execute_with_adapter(&adapter, query).await
    }

    /// Probes with a provided adapter (for testing).
    pub async fn execute_with_adapter(&self, adapter: &dyn SiteAdapter, query: &str) -> Result<String> {
        info!("Probing {} for: {}", adapter.website(), query);

        let outcome = adapter.search_product(&ProductQuery::new(query)).await;
        adapter.release().await;

        Ok(match outcome {
            SiteOutcome::Hit(result) => Formatter::new(self.config.format).format_result(&result),
            SiteOutcome::Miss { website, reason } => format!("{}: no match ({})", website, reason),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::sites::{CandidateStats, MissReason, ScrapeResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockAdapter {
        hit: bool,
        released: AtomicBool,
    }

    #[async_trait]
    impl SiteAdapter for MockAdapter {
        fn website(&self) -> &str {
            "Visions"
        }

        async fn search_product(&self, query: &ProductQuery) -> SiteOutcome {
            if self.hit {
                SiteOutcome::Hit(ScrapeResult::hit("Visions", query.name.clone(), Some(899.99), ""))
            } else {
                let stats = CandidateStats { examined: 5, rejected: 5, ..CandidateStats::default() };
                SiteOutcome::miss("Visions", MissReason::NoAcceptableCandidate(stats))
            }
        }

        async fn release(&self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn make_test_config() -> Config {
        Config { format: OutputFormat::Table, ..Config::default() }
    }

    #[tokio::test]
    async fn test_probe_hit() {
        let adapter = MockAdapter { hit: true, released: AtomicBool::new(false) };
        let output = ProbeCommand::new(make_test_config())
            .execute_with_adapter(&adapter, "SONY 75 X77L")
            .await
            .unwrap();

        assert!(output.contains("Title:   SONY 75 X77L"));
        assert!(output.contains("899.99"));
        assert!(adapter.released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_probe_miss_shows_reason() {
        let adapter = MockAdapter { hit: false, released: AtomicBool::new(false) };
        let output = ProbeCommand::new(make_test_config())
            .execute_with_adapter(&adapter, "SONY 75 X77L")
            .await
            .unwrap();

        assert!(output.starts_with("Visions: no match"));
        assert!(output.contains("5 examined"));
        assert!(output.contains("5 off-target"));
        assert!(adapter.released.load(Ordering::SeqCst));
    }
}
