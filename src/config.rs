//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::engine::{BrandOrder, DEFAULT_BRANDS};
use crate::extract::DEFAULT_MATCH_THRESHOLD;
use crate::sites::Site;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL overrides, keyed by site id
    #[serde(default)]
    pub sites: BTreeMap<Site, String>,

    /// Sites queried by `scan`
    #[serde(default = "default_enabled_sites")]
    pub enabled_sites: Vec<Site>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay before each page request in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Page load timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Result items examined per search page
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Minimum title similarity for a candidate to be accepted
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,

    /// Known brands, in detection order
    #[serde(default = "default_brands")]
    pub brands: Vec<String>,

    /// Extra single-brand storefronts: website label -> brand
    #[serde(default)]
    pub brand_overrides: BTreeMap<String, String>,

    /// Ordering of brand groups in the report
    #[serde(default)]
    pub brand_order: BrandOrder,

    /// Report unattributable hits under "Unknown" instead of dropping them
    #[serde(default)]
    pub keep_unattributed: bool,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Directory the JSON report is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_enabled_sites() -> Vec<Site> {
    Site::all().to_vec()
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_delay_jitter_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_candidates() -> usize {
    5
}

fn default_match_threshold() -> f64 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_brands() -> Vec<String> {
    DEFAULT_BRANDS.iter().map(|b| b.to_string()).collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sites: BTreeMap::new(),
            enabled_sites: default_enabled_sites(),
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            timeout_secs: default_timeout_secs(),
            max_candidates: default_max_candidates(),
            match_threshold: default_match_threshold(),
            brands: default_brands(),
            brand_overrides: BTreeMap::new(),
            brand_order: BrandOrder::default(),
            keep_unattributed: false,
            format: OutputFormat::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("shelf-scout.toml");
        if local_config.exists() {
            debug!("Found shelf-scout.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("shelf-scout").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("SCOUT_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("SCOUT_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(timeout) = std::env::var("SCOUT_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        if let Ok(dir) = std::env::var("SCOUT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }

        self
    }

    /// Base URL for `site`, configured or built in, without a trailing slash.
    pub fn base_url(&self, site: Site) -> String {
        self.sites
            .get(&site)
            .map(String::as_str)
            .unwrap_or_else(|| site.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: json, table, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
