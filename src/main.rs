//! Tracebound main entry point
//!
//! This is the command-line interface for the Tracebound phrase scanner.

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracebound::config::{load_config_or_default, validate, Config};
use tracebound::crawler::{build_http_client, crawl, CrawlReport, CrawlTarget};
use tracebound::output::{writer_for, OutputFormat};
use tracebound::url::{check_connectivity, resolve_base_url, resolves_to_address};
use tracebound::TraceboundError;
use tracing_subscriber::EnvFilter;

/// Tracebound: a sitemap-driven phrase scanner
///
/// Tracebound reads a site's sitemaps, visits every page they list, and
/// reports the pages whose visible text contains the phrase.
#[derive(Parser, Debug)]
#[command(name = "tracebound")]
#[command(version)]
#[command(about = "A scalable, asynchronous domain-based phrase scanner", long_about = None)]
struct Cli {
    /// Domain to scan (e.g. example.com); prompted for if omitted
    #[arg(value_name = "DOMAIN")]
    domain: Option<String>,

    /// Phrase to search for; prompted for if omitted
    #[arg(value_name = "PHRASE")]
    phrase: Option<String>,

    /// Interpret the phrase as a regular expression
    #[arg(long)]
    regex: bool,

    /// Number of concurrent requests
    #[arg(long)]
    concurrency: Option<u32>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Output format for results
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,

    /// Directory to write the results file into
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Enable debug logging output (same as -v)
    #[arg(long)]
    debug: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbosity = if cli.debug { cli.verbose.max(1) } else { cli.verbose };
    setup_logging(verbosity, cli.quiet);

    if !cli.quiet {
        println!("Tracebound v{}\n", env!("CARGO_PKG_VERSION"));
    }

    let config = load_settings(&cli)?;

    let client = build_http_client(&config.user_agent, &config.scanner)
        .context("failed to build HTTP client")?;

    if !check_connectivity(&client).await {
        tracing::error!("No internet connection detected. Exiting.");
        return Err(TraceboundError::Offline.into());
    }

    let domain = match cli.domain.as_deref() {
        Some(domain) => domain.trim().to_string(),
        None => prompt("Enter the domain you want to scan (e.g. example.com): ")?,
    };
    let phrase = match cli.phrase.as_deref() {
        Some(phrase) => phrase.trim().to_string(),
        None => prompt("Enter the phrase you want to search for: ")?,
    };

    let base_url = resolve_base_url(&client, &domain)
        .await
        .with_context(|| format!("invalid domain '{}'", domain))?;
    tracing::info!("Scanning domain: {}", base_url);
    tracing::info!("Searching for phrase: {}", phrase);

    if let Some(host) = url::Url::parse(&base_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
    {
        if !resolves_to_address(&host).await {
            tracing::warn!("The domain '{}' did not resolve to an IP address", host);
        }
    }

    let target = CrawlTarget::new(
        &base_url,
        &phrase,
        cli.regex,
        config.scanner.concurrency as usize,
        config.scanner.timeout(),
    )?;

    let report = tokio::select! {
        result = crawl(target, &config) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Scan interrupted by user.");
            return Ok(());
        }
    };

    write_results(&report, &config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tracebound=info,warn"),
            1 => EnvFilter::new("tracebound=debug,info"),
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

/// Loads the config file (if any), applies command-line overrides, validates
fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        format!(
            "failed to load configuration from {}",
            cli.config
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    })?;

    if let Some(concurrency) = cli.concurrency {
        config.scanner.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.scanner.timeout = timeout;
    }
    if let Some(format) = cli.output {
        config.output.format = format;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }

    validate(&config).context("invalid settings")?;

    tracing::debug!(
        "Concurrency {}, timeout {}s, {} attempts, output {}",
        config.scanner.concurrency,
        config.scanner.timeout,
        config.scanner.retry_attempts,
        config.output.format
    );

    Ok(config)
}

/// Reads one trimmed line from stdin after printing `message`
fn prompt(message: &str) -> std::io::Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Hands the matches to the configured writer
///
/// Nothing is written when the sitemaps yielded no pages at all.
fn write_results(report: &CrawlReport, config: &Config) -> anyhow::Result<()> {
    if report.nothing_scanned() {
        tracing::error!("No page URLs found. Exiting scan.");
        return Ok(());
    }

    let writer = writer_for(config.output.format);
    let path = writer
        .write_file(&report.matches, &config.output.directory)
        .map_err(TraceboundError::from)?;

    tracing::info!(
        "Found phrase on {} pages. Results written to {}",
        report.match_count(),
        path.display()
    );

    Ok(())
}
