//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror incremental web mirror.

use anyhow::Context;
use clap::Parser;
use site_mirror::config::{config_from_env, load_config_with_hash, Config};
use site_mirror::crawler::run_crawl;
use site_mirror::hosted::run_hosted;
use site_mirror::storage::{JsonFileStore, MetadataStore};
use site_mirror::CrawlMode;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Site-Mirror: an incremental web-to-Markdown mirror
///
/// Site-Mirror reads seed URLs from the `.metadata.json` document in the
/// working directory, mirrors the pages (and linked PDFs) it finds as local
/// files, and prunes anything that disappeared since the last run.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "An incremental web-to-Markdown mirror", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults plus environment when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Mirror root (overrides configuration and environment)
    #[arg(short, long, value_name = "DIR")]
    workdir: Option<PathBuf>,

    /// Crawl backend (overrides configuration and environment)
    #[arg(short, long, value_enum)]
    mode: Option<CrawlMode>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and metadata and show what would be mirrored without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(cli.config.as_deref())?;
    if let Some(dir) = cli.workdir {
        config.workspace.dir = Some(dir);
    }
    if let Some(mode) = cli.mode {
        config.crawler.mode = mode;
    }

    let working_dir = config
        .working_dir()
        .context("Failed to resolve working directory")?;
    tracing::info!(
        "Mirroring into {} ({} mode)",
        working_dir.display(),
        config.crawler.mode
    );

    if cli.dry_run {
        return handle_dry_run(&config, &working_dir);
    }

    handle_pass(&config, &working_dir).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mirror=info,warn"),
            1 => EnvFilter::new("site_mirror=debug,info"),
            2 => EnvFilter::new("site_mirror=trace,debug"),
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

/// Loads the configuration file if one was given, otherwise defaults plus environment
fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => config_from_env().context("Invalid configuration from environment"),
    }
}

/// Handles the --dry-run mode: checks the metadata document and lists the seeds
fn handle_dry_run(config: &Config, working_dir: &Path) -> anyhow::Result<()> {
    let store = JsonFileStore::new(config.metadata_path(working_dir));
    let metadata = store
        .load()
        .with_context(|| format!("Failed to load {}", store.path().display()))?;

    println!("=== Site-Mirror Dry Run ===\n");
    println!("Mode: {}", config.crawler.mode);
    println!("Working directory: {}", working_dir.display());
    println!("Metadata: {}", store.path().display());
    if config.crawler.mode == CrawlMode::Hosted {
        println!("Crawl API: {}", config.hosted.endpoint);
    }

    let seeds = metadata.seed_urls();
    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {}", seed);
    }

    println!("\nExcluded ({}):", metadata.input.exclude.len());
    for url in &metadata.input.exclude {
        println!("  - {}", url);
    }

    println!(
        "\nCurrently mirrored: {} artifacts in {} folders",
        metadata.output.pages.len(),
        metadata.output.folders.len()
    );

    Ok(())
}

/// Handles the main mirror pass
async fn handle_pass(config: &Config, working_dir: &Path) -> anyhow::Result<()> {
    let result = match config.crawler.mode {
        CrawlMode::Follow => run_crawl(config, working_dir).await,
        CrawlMode::Hosted => run_hosted(config, working_dir).await,
    };

    let (metadata, report) = result.context("Mirror pass failed")?;
    tracing::info!(
        "Mirror up to date: {} artifacts, {} removed, {} removal failures",
        metadata.output.pages.len(),
        report.pages_removed,
        report.failures
    );
    if !metadata.output.error.is_empty() {
        tracing::warn!("Pass completed with errors: {}", metadata.output.error);
    }

    Ok(())
}
