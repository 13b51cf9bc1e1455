//! Statute-Harvest main entry point
//!
//! This is the command-line interface for the Statute-Harvest catalog harvester.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use statute_harvest::config::{load_config_with_hash, validate, Config};
use statute_harvest::crawler::{Harvester, Stage};
use statute_harvest::output::{list_catalog, print_crawl_summary, print_download_report};
use statute_harvest::storage::open_storage;
use tracing_subscriber::EnvFilter;

/// Statute-Harvest: A polite catalog harvester
///
/// Statute-Harvest walks the statute catalog (index, alphabetical groups, group
/// pages), stores every record as JSON, and downloads the linked PDFs with a
/// bounded number of parallel transfers and a pause between groups.
#[derive(Parser, Debug)]
#[command(name = "statute-harvest")]
#[command(version)]
#[command(about = "A polite statute catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Stage to start from; earlier stages are loaded from disk
    /// (index, groups, details, download)
    #[arg(long, value_name = "STAGE", default_value = "index")]
    from: Stage,

    /// Print the stored catalog and exit
    #[arg(long, conflicts_with_all = ["from", "skip_download"])]
    list: bool,

    /// Stop after the catalog is built
    #[arg(long)]
    skip_download: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the site base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Override the data directory
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Override the number of parallel downloads
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Override the pause between groups (milliseconds)
    #[arg(long, value_name = "MS")]
    pacing_delay: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    if cli.list {
        let storage = open_storage(&config.output);
        list_catalog(&storage).context("failed to list stored catalog")?;
        return Ok(());
    }

    handle_harvest(config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("statute_harvest=info,warn"),
            1 => EnvFilter::new("statute_harvest=debug,info"),
            2 => EnvFilter::new("statute_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any), applies overrides and validates
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("cannot load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(base_url) = &cli.base_url {
        config.site.base_url = base_url.clone();
    }
    if let Some(data_dir) = &cli.data_dir {
        config.output.data_dir = data_dir.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.download.concurrency = concurrency;
    }
    if let Some(pacing_delay) = cli.pacing_delay {
        config.download.pacing_delay_ms = pacing_delay;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, cli: &Cli) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting {} into {}",
        config.site.base_url,
        config.output.data_dir.display()
    );
    tracing::info!(
        "Downloads: {} parallel, {}ms between groups, {} retries",
        config.download.concurrency,
        config.download.pacing_delay_ms,
        config.download.max_retries
    );

    let harvester = Harvester::from_config(config)?.with_progress(!cli.quiet);
    let download = !cli.skip_download;

    if cli.from == Stage::Download && !download {
        bail!("--from download together with --skip-download leaves nothing to do");
    }

    // Run the harvest
    let outcome = match harvester.run_from(cli.from, download).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    if !cli.quiet {
        if let Some(summary) = &outcome.crawl {
            print_crawl_summary(summary);
        }
        if let Some(report) = &outcome.download {
            print_download_report(report);
        }
    }

    if let Some(report) = &outcome.download {
        if !report.is_clean() {
            tracing::warn!(
                "{} downloads failed permanently; re-run with --from download to retry",
                report.total_failed()
            );
        }
    }

    Ok(())
}
