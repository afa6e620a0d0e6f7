use crate::crawler::matcher::PhraseMatcher;
use crate::url::{base_url_string, parse_base_url, sitemap_seeds};
use crate::{ConfigError, TraceboundError};
use std::sync::Arc;
use std::time::Duration;

/// Everything a single crawl needs to know, fixed before it starts
///
/// The phrase matcher is compiled here, so a bad pattern is reported before
/// any request is made.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    base_url: String,
    phrase: String,
    matcher: Arc<PhraseMatcher>,
    concurrency_limit: usize,
    timeout: Duration,
}

impl CrawlTarget {
    /// Validates the inputs and builds a target
    ///
    /// # Arguments
    ///
    /// * `base_url` - Scheme-qualified base URL of the site
    /// * `phrase` - Phrase or pattern to look for; an empty plain phrase
    ///   matches every fetched page
    /// * `is_regex` - Treat `phrase` as a regular expression
    /// * `concurrency_limit` - Maximum in-flight fetches (>= 1)
    /// * `timeout` - Per-request timeout (> 0)
    pub fn new(
        base_url: &str,
        phrase: &str,
        is_regex: bool,
        concurrency_limit: usize,
        timeout: Duration,
    ) -> Result<Self, TraceboundError> {
        let url = parse_base_url(base_url)?;

        if concurrency_limit < 1 {
            return Err(ConfigError::Validation(format!(
                "concurrency must be >= 1, got {}",
                concurrency_limit
            ))
            .into());
        }

        if timeout.is_zero() {
            return Err(
                ConfigError::Validation("timeout must be greater than zero".to_string()).into(),
            );
        }

        let matcher = PhraseMatcher::new(phrase, is_regex)?;

        Ok(Self {
            base_url: base_url_string(&url),
            phrase: phrase.to_string(),
            matcher: Arc::new(matcher),
            concurrency_limit,
            timeout,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn is_regex(&self) -> bool {
        self.matcher.is_regex()
    }

    pub fn matcher(&self) -> Arc<PhraseMatcher> {
        Arc::clone(&self.matcher)
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Seed sitemap URLs for this site
    pub fn sitemap_seeds(&self) -> Vec<String> {
        sitemap_seeds(&self.base_url)
    }
}
