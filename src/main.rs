//! Site-Audit main entry point
//!
//! This is the command-line interface for the Site-Audit SEO crawler.

use anyhow::Context;
use clap::Parser;
use site_audit::config::{load_config_with_hash, validate, Config, ExtractionMode};
use site_audit::output::{print_statistics, write_outputs, SiteStatistics};
use site_audit::url::with_default_scheme;
use site_audit::Auditor;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Audit: an SEO crawler
///
/// Site-Audit crawls every page of a site reachable from the start URL,
/// extracts on-page SEO signals, checks links and images, and writes a JSON
/// report with one entry per crawled page.
#[derive(Parser, Debug)]
#[command(name = "site-audit")]
#[command(version = "1.0.0")]
#[command(about = "An SEO site crawler", long_about = None)]
struct Cli {
    /// Start URL; "https://" is assumed when no scheme is given
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Extract on-page signals only, without robots.txt or probes
    #[arg(long)]
    light: bool,

    /// Stop after this many pages
    #[arg(long, conflicts_with = "no_page_limit")]
    max_pages: Option<usize>,

    /// Crawl until the queue drains
    #[arg(long)]
    no_page_limit: bool,

    /// Maximum link depth from the start URL
    #[arg(long)]
    max_depth: Option<u32>,

    /// Delay between pages in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Write the JSON report to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    json: Option<String>,

    /// Write a markdown summary to this file
    #[arg(long, value_name = "PATH")]
    summary: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    let start_url = with_default_scheme(&cli.url);

    if cli.dry_run {
        handle_dry_run(&config, &start_url);
        return Ok(());
    }

    handle_audit(config, &start_url).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout stays reserved for the JSON report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_audit=info,warn"),
            1 => EnvFilter::new("site_audit=debug,info"),
            2 => EnvFilter::new("site_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line flags on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if cli.light {
        config.extractor.mode = ExtractionMode::Light;
    }
    if cli.no_page_limit {
        config.crawler.max_pages = None;
    } else if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = Some(max_depth);
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.crawler.delay_ms = delay_ms;
    }
    if let Some(json) = &cli.json {
        config.output.json_path = Some(json.clone());
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.clone());
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, start_url: &str) {
    println!("=== Site-Audit Dry Run ===\n");

    println!("Start URL: {}\n", start_url);

    println!("Crawler Configuration:");
    println!("  Delay: {}ms", config.crawler.delay_ms);
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }
    match config.crawler.max_depth {
        Some(max) => println!("  Max depth: {}", max),
        None => println!("  Max depth: unlimited"),
    }
    println!("  Query policy: {:?}", config.crawler.query_policy);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    if !config.crawler.extra_domains.is_empty() {
        println!("  Extra domains: {}", config.crawler.extra_domains.join(", "));
    }

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Min body length: {}", config.fetcher.min_body_length);
    match &config.fetcher.render_command {
        Some(command) => println!(
            "  Render command: {} (timeout {}s)",
            command.join(" "),
            config.fetcher.render_timeout_secs
        ),
        None => println!("  Render command: none"),
    }

    println!("\nExtractor:");
    println!("  Mode: {:?}", config.extractor.mode);
    println!("  Image probe limit: {}", config.extractor.image_probe_limit);
    println!(
        "  Probe internal links: {}",
        config.extractor.probe_internal_links
    );

    println!("\nOutput:");
    println!(
        "  JSON: {}",
        config.output.json_path.as_deref().unwrap_or("stdout")
    );
    println!(
        "  Summary: {}",
        config.output.summary_path.as_deref().unwrap_or("none")
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the main audit operation
async fn handle_audit(config: Config, start_url: &str) -> anyhow::Result<()> {
    let auditor = Auditor::new(config).context("Failed to set up the auditor")?;

    let report = match auditor.run(start_url).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Audit failed: {}", e);
            return Err(e.into());
        }
    };

    let output = &auditor.config().output;
    write_outputs(&report, output).context("Failed to write the audit report")?;

    // Statistics would interleave with the JSON on stdout
    if output.json_path.is_some() {
        print_statistics(&SiteStatistics::from_report(&report));
    }

    Ok(())
}
