//! Crawler module for sitemap discovery and page scanning
//!
//! This module contains the core crawl-and-scan pipeline, including:
//! - HTTP fetching with retry and exponential backoff
//! - Recursive sitemap resolution with cycle avoidance
//! - Visible-text extraction and phrase matching
//! - Bounded-concurrency coordination of the whole run

mod coordinator;
mod fetcher;
mod matcher;
mod parser;
mod scanner;
mod scheduler;
mod sitemap;
mod target;


pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{
    build_http_client, retry_fetch, AttemptOutcome, FetchOutcome, HttpFetcher, PageFetcher,
    RetryPolicy,
};
pub use matcher::PhraseMatcher;
pub use parser::extract_visible_text;
pub use scanner::{MatchResult, PageScanner};
pub use scheduler::{ConcurrencyLimit, LimitedFetcher};
pub use sitemap::{
    is_nested_sitemap, parse_sitemap, SitemapError, SitemapResolver, SitemapVisitSet,
    SITEMAP_NAMESPACE,
};
pub use target::CrawlTarget;

use crate::config::Config;
use crate::TraceboundError;

/// Runs a complete crawl for `target`
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Resolve the site's sitemaps into page URLs
/// 3. Scan every page for the phrase under the concurrency limit
/// 4. Return the matched URLs with run counters
///
/// # Arguments
///
/// * `target` - What to crawl and what to look for
/// * `config` - User agent and retry settings
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished (possibly with zero pages)
/// * `Err(TraceboundError)` - Crawl could not be set up
pub async fn crawl(target: CrawlTarget, config: &Config) -> Result<CrawlReport, TraceboundError> {
    run_crawl(target, config).await
}
