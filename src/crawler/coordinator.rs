//! Crawler coordinator - main crawl orchestration logic
//!
//! This module runs a crawl from start to finish:
//! - Resolving the site's sitemaps into a set of page URLs
//! - Dispatching one scan per page under the concurrency limit
//! - Collecting results as scans complete, isolating per-page failures
//! - Reporting progress and the final match count

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, HttpFetcher, PageFetcher, RetryPolicy};
use crate::crawler::scanner::{MatchResult, PageScanner};
use crate::crawler::scheduler::{ConcurrencyLimit, LimitedFetcher};
use crate::crawler::sitemap::SitemapResolver;
use crate::crawler::target::CrawlTarget;
use crate::TraceboundError;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinError, JoinSet};

/// Completed scans between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Result of a whole crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// URLs whose text matched, in completion order
    pub matches: Vec<String>,

    /// Unique page URLs found in the sitemaps
    pub pages_discovered: usize,

    /// Scans that ran to completion (fetched or not)
    pub pages_scanned: usize,

    /// Pages that could not be fetched or whose scan failed
    pub pages_failed: usize,
}

impl CrawlReport {
    /// True when the sitemaps yielded nothing to scan
    pub fn nothing_scanned(&self) -> bool {
        self.pages_discovered == 0
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

/// What a scan task hands back: its URL and either a result or a panic message
struct ScanTaskOutput {
    url: String,
    result: Result<MatchResult, String>,
}

/// Main crawler coordinator structure
pub struct Coordinator<F> {
    target: CrawlTarget,
    fetcher: Arc<F>,
    limit: ConcurrencyLimit,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// The client uses the target's timeout and concurrency; user agent and
    /// retry settings come from `config`.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(TraceboundError)` - The HTTP client could not be built
    pub fn new(target: CrawlTarget, config: &Config) -> Result<Self, TraceboundError> {
        let mut scanner = config.scanner.clone();
        scanner.timeout = target.timeout().as_secs().max(1);
        scanner.concurrency = u32::try_from(target.concurrency_limit()).unwrap_or(u32::MAX);

        let client = build_http_client(&config.user_agent, &scanner)?;
        let fetcher = HttpFetcher::new(client, target.timeout(), RetryPolicy::from_config(&scanner));

        Ok(Self::with_fetcher(target, Arc::new(fetcher)))
    }
}

impl<F: PageFetcher + 'static> Coordinator<F> {
    /// Creates a coordinator over any fetcher
    pub fn with_fetcher(target: CrawlTarget, fetcher: Arc<F>) -> Self {
        let limit = ConcurrencyLimit::new(target.concurrency_limit());
        Self {
            target,
            fetcher,
            limit,
        }
    }

    /// Runs the crawl
    ///
    /// 1. Resolves `/sitemap.xml` and `/sitemap_index.xml` under the base URL
    /// 2. Stops early with an empty report if no page URL was found
    /// 3. Scans every page, at most `concurrency_limit` at a time
    /// 4. Returns once every dispatched scan has finished
    pub async fn run(&self) -> CrawlReport {
        let start_time = Instant::now();
        tracing::info!(
            "Starting crawl of {} for {} '{}'",
            self.target.base_url(),
            if self.target.is_regex() { "pattern" } else { "phrase" },
            self.target.phrase()
        );

        let pages = self.discover_pages().await;
        if pages.is_empty() {
            tracing::warn!("No page URLs found in sitemaps, nothing to scan");
            return CrawlReport::default();
        }

        tracing::info!("Beginning page scan of {} pages...", pages.len());
        let report = self.scan_pages(pages).await;

        tracing::info!(
            "Scan complete. Found phrase on {} of {} pages ({} failed) in {:?}",
            report.match_count(),
            report.pages_discovered,
            report.pages_failed,
            start_time.elapsed()
        );

        report
    }

    /// Phase 1: sitemap resolution
    async fn discover_pages(&self) -> HashSet<String> {
        let seeds = self.target.sitemap_seeds();
        for seed in &seeds {
            tracing::info!("Looking for sitemap at: {}", seed);
        }

        let fetcher = Arc::new(LimitedFetcher::new(
            Arc::clone(&self.fetcher),
            self.limit.clone(),
        ));
        let resolver = SitemapResolver::new(fetcher);
        let pages = resolver.resolve(&seeds).await;

        tracing::info!(
            "Found {} unique page URLs in {} sitemaps",
            pages.len(),
            resolver.visited().len()
        );
        pages
    }

    /// Phase 2: bounded fan-out of page scans
    ///
    /// A slot is taken before each task is spawned and released when the task
    /// ends, so no more than `limit` scans exist at once. Finished tasks are
    /// reaped before new slots are requested.
    async fn scan_pages(&self, pages: HashSet<String>) -> CrawlReport {
        let scanner = Arc::new(PageScanner::new(
            Arc::clone(&self.fetcher),
            self.target.matcher(),
        ));

        let mut report = CrawlReport {
            pages_discovered: pages.len(),
            ..CrawlReport::default()
        };
        let mut queue: Vec<String> = pages.into_iter().collect();
        let mut tasks: JoinSet<ScanTaskOutput> = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                Some(joined) = tasks.join_next() => {
                    record(&mut report, joined);
                }

                permit = self.limit.acquire(), if !queue.is_empty() => {
                    let Some(url) = queue.pop() else {
                        continue;
                    };

                    let scanner = Arc::clone(&scanner);
                    tasks.spawn(async move {
                        let _permit = permit;
                        let result = AssertUnwindSafe(scanner.scan(&url))
                            .catch_unwind()
                            .await
                            .map_err(panic_message);
                        ScanTaskOutput { url, result }
                    });
                }

                else => break,
            }
        }

        report
    }
}

/// Folds one finished task into the report
fn record(report: &mut CrawlReport, joined: Result<ScanTaskOutput, JoinError>) {
    report.pages_scanned += 1;

    match joined {
        Ok(ScanTaskOutput {
            result: Ok(result), ..
        }) => {
            if !result.fetched {
                report.pages_failed += 1;
            }
            if result.matched {
                report.matches.push(result.url);
            }
        }
        Ok(ScanTaskOutput {
            url,
            result: Err(message),
        }) => {
            tracing::error!("Error scanning {}: {}", url, message);
            report.pages_failed += 1;
        }
        Err(e) => {
            tracing::error!("Error scanning a page: {}", e);
            report.pages_failed += 1;
        }
    }

    if report.pages_scanned % PROGRESS_INTERVAL == 0 {
        tracing::info!(
            "Progress: {}/{} pages scanned, {} matches",
            report.pages_scanned,
            report.pages_discovered,
            report.matches.len()
        );
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scan panicked".to_string()
    }
}

/// Runs a complete crawl over HTTP
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl finished; individual page failures are
///   counted in the report
/// * `Err(TraceboundError)` - The crawl could not be set up
pub async fn run_crawl(target: CrawlTarget, config: &Config) -> Result<CrawlReport, TraceboundError> {
    let coordinator = Coordinator::new(target, config)?;
    Ok(coordinator.run().await)
}
