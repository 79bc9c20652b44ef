//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror website archiver.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_mirror::config::{compute_config_hash, read_config, resolve_config, Config, ConfigOverrides};
use sumi_mirror::crawler::mirror_site;
use sumi_mirror::output::print_summary;
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: an offline website archiver
///
/// Sumi-Mirror crawls a site breadth-first from a seed URL, saves every page,
/// stylesheet, script and media file it can discover, rewrites saved pages to
/// reference the local copies and packages the result into one zip archive.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version = "1.0.0")]
#[command(about = "An offline website archiver", long_about = None)]
struct Cli {
    /// URL to start mirroring from (overrides the config file)
    #[arg(value_name = "SEED_URL")]
    seed_url: Option<String>,

    /// Path of the archive to write
    #[arg(short, long, value_name = "ARCHIVE")]
    output: Option<PathBuf>,

    /// Maximum link depth from the seed (0 = unlimited)
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Maximum number of files to download (0 = unlimited)
    #[arg(long, value_name = "N")]
    max_files: Option<u64>,

    /// Seconds to wait before each page
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Number of concurrent sub-resource fetches
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Retries for timeouts, connection errors and 5xx responses
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write the manifest next to the archive
    #[arg(long)]
    manifest_sidecar: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and show what would be mirrored without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let base = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = read_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let overrides = ConfigOverrides {
        seed_url: cli.seed_url,
        archive_path: cli.output,
        max_depth: cli.max_depth,
        max_files: cli.max_files,
        delay_seconds: cli.delay,
        concurrency: cli.concurrency,
        max_retries: cli.max_retries,
        manifest_sidecar: cli.manifest_sidecar,
    };
    let config = resolve_config(base, overrides).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_mirror(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
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

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    let limit = |value: u64| {
        if value == 0 {
            "unlimited".to_string()
        } else {
            value.to_string()
        }
    };

    println!("=== Sumi-Mirror Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Seed URL: {}",
        config.crawler.seed_url.as_deref().unwrap_or("-")
    );
    println!("  Max depth: {}", limit(config.crawler.max_depth as u64));
    println!("  Max files: {}", limit(config.crawler.max_files));
    println!("  Delay: {}s", config.crawler.delay_seconds);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Timeout: {}s", config.crawler.timeout_seconds);
    println!(
        "  Retries: {} (backoff {}ms)",
        config.crawler.max_retries, config.crawler.retry_backoff_ms
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  Archive: {}", config.output.archive_path.display());
    println!("  Scratch directory: {}", config.output.scratch_dir.display());
    println!("  Manifest sidecar: {}", config.output.manifest_sidecar);

    println!("\n✓ Configuration is valid");
}

/// Handles the main mirror operation
async fn handle_mirror(config: Config) -> anyhow::Result<()> {
    match mirror_site(config).await {
        Ok(summary) => {
            tracing::info!("Mirror completed successfully");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Mirror failed: {}", e);
            Err(e.into())
        }
    }
}
