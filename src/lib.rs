//! Tracebound: a sitemap-driven phrase scanner
//!
//! This crate walks a site's sitemap tree, collects every page URL it can
//! find, and scans each page's visible text for a phrase or regular
//! expression under a bounded number of concurrent requests.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Tracebound operations
///
/// Per-page and per-sitemap failures are never surfaced through this type;
/// they are logged and folded into the crawl report. Only setup failures
/// (configuration, client construction, bad patterns, output) end up here.
#[derive(Debug, Error)]
pub enum TraceboundError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("No internet connection detected")]
    Offline,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Empty domain")]
    Empty,
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, CrawlTarget, PhraseMatcher};
pub use output::{OutputFormat, ResultWriter};
