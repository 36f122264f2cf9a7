//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror static site mirror.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_mirror::config::{load_config_with_hash, validate, Config};
use sumi_mirror::crawler::Coordinator;
use sumi_mirror::output::print_summary;
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: A polite static site mirror
///
/// Sumi-Mirror crawls a single website breadth-first within a depth and page
/// budget, saving every page and embedded asset into a local directory tree
/// that mirrors the site's URL structure.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version)]
#[command(about = "A polite static site mirror", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be mirrored without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Override crawler.root-url
    #[arg(long, value_name = "URL")]
    root_url: Option<String>,

    /// Override output.directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Override crawler.max-depth
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Override crawler.max-pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(root_url) = &self.root_url {
            config.crawler.root_url = root_url.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output.directory = output_dir.display().to_string();
        }
        if let Some(max_depth) = self.max_depth {
            config.crawler.max_depth = max_depth;
        }
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = max_pages;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration after command-line overrides")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_mirror(config, config_hash, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_mirror=info,warn"),
            1 => EnvFilter::new("sumi_mirror=debug,info"),
            2 => EnvFilter::new("sumi_mirror=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Mirror Dry Run ===\n");

    println!("Crawler:");
    println!("  Root URL: {}", config.crawler.root_url);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);

    println!("\nFetcher:");
    println!("  Strategy: {}", config.fetcher.strategy.as_str());
    println!("  Request timeout: {}s", config.fetcher.request_timeout_secs);
    println!(
        "  Attempts: {} (backoff step {}ms)",
        config.fetcher.max_attempts, config.fetcher.backoff_step_ms
    );
    println!("  User agent: {}", config.fetcher.user_agent);

    println!("\nExtractor:");
    println!(
        "  Excluded link extensions: {}",
        config.extractor.link_exclusions.join(", ")
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    match &config.output.summary_path {
        Some(path) => println!("  Report: {}", path),
        None => println!("  Report: (none)"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main mirror operation
async fn handle_mirror(config: Config, config_hash: String, quiet: bool) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config)
        .await
        .context("Failed to start mirror run")?
        .with_config_hash(config_hash);

    tracing::info!(
        "Mirroring {} into {}",
        coordinator.root(),
        coordinator.output_dir().display()
    );

    let cancel = coordinator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight requests");
            cancel.cancel();
        }
    });

    let summary = coordinator.run().await.context("Mirror run failed")?;

    if !quiet {
        println!();
        print_summary(&summary);
    }

    Ok(())
}
