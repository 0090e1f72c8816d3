//! Patent-Harvester main entry point
//!
//! This is the command-line interface for the Patent-Harvester crawler.

use anyhow::Context;
use clap::Parser;
use patent_harvester::config::{load_config_with_hash, validate, Config};
use patent_harvester::crawler::crawl;
use patent_harvester::output::print_report;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Patent-Harvester: a patent-detail crawler feeding a search index
///
/// Patent-Harvester walks the patents-by-issue-date listings year by year,
/// extracts every patent detail page into a structured document and submits
/// the documents to Elasticsearch in batches.
#[derive(Parser, Debug)]
#[command(name = "patent-harvester")]
#[command(version)]
#[command(about = "Crawls patent detail pages into a search index", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Elasticsearch endpoint, overriding `[index] endpoint`
    #[arg(long, env = "INDEX_URL", value_name = "URL")]
    index_url: Option<String>,

    /// Elasticsearch host, used when no index URL is given
    #[arg(long, env = "ES_HOST", value_name = "HOST")]
    es_host: Option<String>,

    /// Elasticsearch port paired with the host
    #[arg(long, env = "ES_PORT", value_name = "PORT", default_value_t = 9200)]
    es_port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("patent_harvester=info,warn"),
            1 => EnvFilter::new("patent_harvester=debug,info"),
            2 => EnvFilter::new("patent_harvester=trace,debug"),
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

/// Loads the configuration file (if any) and applies command-line overrides
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if let Some(endpoint) = endpoint_override(cli) {
        tracing::info!("Index endpoint overridden: {}", endpoint);
        config.index.endpoint = endpoint;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Resolves the index endpoint given on the command line or in the environment
///
/// A full URL wins over a host/port pair. A host without a scheme is
/// assumed to speak plain HTTP.
fn endpoint_override(cli: &Cli) -> Option<String> {
    if let Some(index_url) = &cli.index_url {
        return Some(index_url.clone());
    }

    cli.es_host.as_deref().map(|host| {
        let host = host.trim_end_matches('/');
        if host.contains("://") {
            format!("{}:{}", host, cli.es_port)
        } else {
            format!("http://{}:{}", host, cli.es_port)
        }
    })
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Patent-Harvester Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Root path: {}", config.site.root_path);

    println!("\nCrawler Configuration:");
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);
    println!("  Detail retries: {}", config.crawler.detail_retries);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);

    println!("\nListing Selectors:");
    println!("  Years: {}", config.selectors.year_links);
    println!("  Issue dates: {}", config.selectors.issue_links);
    println!("  Results: {}", config.selectors.result_links);
    println!(
        "  Next page: {} containing '{}'",
        config.selectors.next_links, config.selectors.next_label
    );

    println!("\nIndex:");
    println!("  Endpoint: {}", config.index.endpoint);
    println!("  Name: {}", config.index.name);
    println!("  Batch size: {}", config.index.batch_size);
    println!("  Pause after failed flush: {}s", config.index.failure_pause_secs);
    println!(
        "  Authentication: {}",
        config.index.username.as_deref().unwrap_or("none")
    );

    let schema = config.schema();
    let source = if config.schema.is_empty() {
        "built-in"
    } else {
        "configured"
    };
    println!("\nExtraction Schema ({}, {} fields):", source, schema.rules.len());
    for rule in &schema.rules {
        println!("  - {:?} ({:?}) <- {:?}", rule.field, rule.kind, rule.locator);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling at {}{}",
        config.site.base_url.trim_end_matches('/'),
        config.site.root_path
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {}{} into index '{}'",
        config.site.base_url.trim_end_matches('/'),
        config.site.root_path,
        config.index.name
    );

    match crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed successfully: {} documents inserted",
                report.documents_submitted()
            );
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
