//! AdSweep main entry point
//!
//! This is the command-line interface for the AdSweep ad-policy site auditor.

use adsweep::config::{compute_config_hash, read_config, validate, CrawlConfig};
use adsweep::crawler::{audit_site, build_http_client};
use adsweep::output::{print_statistics, AuditStatistics};
use adsweep::render::HttpRenderer;
use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// AdSweep: an ad-policy site auditor
///
/// AdSweep crawls a website while respecting robots.txt and per-host rate
/// limits, runs advertising and content policy detectors over every page, and
/// writes findings.json and report.html with an aggregate account risk score.
#[derive(Parser, Debug)]
#[command(name = "adsweep")]
#[command(version)]
#[command(about = "An ad-policy site auditor", long_about = None)]
struct Cli {
    /// Site root to audit (absolute http(s) URL)
    #[arg(long, value_name = "URL")]
    site: Option<String>,

    /// Path to a TOML configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory for findings.json and report.html
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Number of concurrent crawl workers
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Honour robots.txt (true|false)
    #[arg(long, value_name = "BOOL")]
    respect_robots: Option<bool>,

    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Only crawl canonical URLs matching this regex
    #[arg(long, value_name = "RE")]
    include_regex: Option<String>,

    /// Never crawl canonical URLs matching this regex
    #[arg(long, value_name = "RE")]
    exclude_regex: Option<String>,

    /// Drop query strings when canonicalizing URLs
    #[arg(long)]
    ignore_querystrings: bool,

    /// Minimum interval between requests to the same host
    #[arg(long, value_name = "MS")]
    rate_limit_ms: Option<u64>,

    /// Run the program-policy detectors (true|false)
    #[arg(long, value_name = "BOOL")]
    policy_checks: Option<bool>,

    /// Do not store noindex pages in the skipped-page database
    #[arg(long)]
    no_list_skipped: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and print it without auditing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_audit(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("adsweep=info,warn"),
            1 => EnvFilter::new("adsweep=debug,info"),
            2 => EnvFilter::new("adsweep=trace,debug"),
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

/// Loads the optional config file and layers command-line flags over it
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = read_config(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => CrawlConfig::for_site(String::new()),
    };

    if let Some(site) = &cli.site {
        config.site = site.clone();
    }
    if config.site.is_empty() {
        bail!("No site given: pass --site or set `site` in the config file");
    }

    if let Some(out) = &cli.out {
        config.out_dir = out.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.max_pages = max_pages;
    }
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(respect_robots) = cli.respect_robots {
        config.respect_robots = respect_robots;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.user_agent = user_agent.clone();
    }
    if let Some(include) = &cli.include_regex {
        config.include_regex = Some(include.clone());
    }
    if let Some(exclude) = &cli.exclude_regex {
        config.exclude_regex = Some(exclude.clone());
    }
    if cli.ignore_querystrings {
        config.ignore_querystrings = true;
    }
    if let Some(rate_limit_ms) = cli.rate_limit_ms {
        config.rate_limit_ms = rate_limit_ms;
    }
    if let Some(policy_checks) = cli.policy_checks {
        config.policy_checks = policy_checks;
    }
    if cli.no_list_skipped {
        config.list_skipped = false;
    }

    Ok(config)
}

/// Handles the --dry-run mode: prints the validated configuration
fn handle_dry_run(config: &CrawlConfig) {
    println!("=== AdSweep Dry Run ===\n");

    println!("Site: {}", config.site);
    println!("Output directory: {}", config.out_dir.display());

    println!("\nCrawl:");
    println!("  Max pages: {}", config.max_pages);
    println!("  Max depth: {}", config.max_depth);
    println!("  Concurrency: {}", config.concurrency);
    println!("  Rate limit: {}ms per host", config.rate_limit_ms);
    println!("  Render timeout: {}ms", config.render_timeout_ms);
    println!("  Respect robots.txt: {}", config.respect_robots);
    println!("  User agent: {}", config.user_agent);
    println!("  Ignore query strings: {}", config.ignore_querystrings);

    println!("\nFilters:");
    println!(
        "  Include: {}",
        config.include_regex.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Exclude: {}",
        config.exclude_regex.as_deref().unwrap_or("(none)")
    );

    println!("\nDetectors:");
    println!("  Program policy checks: {}", config.policy_checks);
    println!("  Duplicate threshold: {}", config.duplicate_threshold);

    println!("\nSkipped pages:");
    if config.list_skipped {
        println!("  Database: {}", config.database_path().display());
    } else {
        println!("  Not stored");
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the normal audit mode
async fn handle_audit(config: CrawlConfig, quiet: bool) -> anyhow::Result<()> {
    let client = build_http_client(
        &config.user_agent,
        Duration::from_millis(config.render_timeout_ms),
    )
    .context("Failed to build HTTP client")?;
    let renderer = Arc::new(HttpRenderer::new(client, config.concurrency));

    let report = audit_site(config, renderer).await?;

    if !quiet {
        println!();
        print_statistics(&AuditStatistics::from_report(&report));
    }

    Ok(())
}
