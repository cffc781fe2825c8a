//! shelf-scout - Multi-retailer product price lookup CLI
//!
//! Looks up a list of products across retail sites and writes a
//! brand-grouped price report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use shelf_scout::commands::{ProbeCommand, ScanCommand};
use shelf_scout::config::{Config, OutputFormat};
use shelf_scout::sites::Site;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shelf-scout",
    version,
    about = "Multi-retailer product price lookup",
    long_about = "Searches several retail sites for each product in a query list and writes a brand-grouped price report."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "SCOUT_PROXY")]
    proxy: Option<String>,

    /// Base delay before each page request in milliseconds
    #[arg(long, global = true)]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (json, table, markdown, csv)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up every product in a query file across all enabled sites
    Scan {
        /// JSON file with an array of {"name": "..."} objects
        queries: PathBuf,

        /// Only search these sites (comma-separated)
        #[arg(long, value_delimiter = ',')]
        sites: Option<Vec<Site>>,

        /// Directory for the timestamped JSON report
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the report without writing it to disk
        #[arg(long)]
        no_write: bool,
    },

    /// Run a single query against a single site
    Probe {
        /// Site to search
        #[arg(short, long)]
        site: Site,

        /// Product name
        query: String,
    },

    /// List supported sites
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Scan { queries, sites, output_dir, no_write } => {
            if let Some(mut sites) = sites {
                sites.sort();
                sites.dedup();
                config.enabled_sites = sites;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }

            let cmd = ScanCommand::new(config).write_report(!no_write);
            let output = cmd.execute(&queries).await?;

            println!("{}", output.rendered);
            if let Some(path) = output.report_path {
                eprintln!("Report written to {}", path.display());
            }
        }

        Commands::Probe { site, query } => {
            let cmd = ProbeCommand::new(config);
            let output = cmd.execute(site, &query).await?;
            println!("{}", output);
        }

        Commands::Sites => {
            println!("Supported sites:\n");
            println!("{:<12} {:<12} {:<30} {:<10}", "Id", "Website", "Base URL", "Brand");
            println!("{:-<12} {:-<12} {:-<30} {:-<10}", "", "", "", "");

            for site in Site::all() {
                println!(
                    "{:<12} {:<12} {:<30} {:<10}",
                    site.to_string(),
                    site.website(),
                    config.base_url(*site),
                    site.brand_override().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}
