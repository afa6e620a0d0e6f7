//! HTTP fetcher implementation
//!
//! This module handles every network retrieval the crawler makes:
//! - Building the shared HTTP client with the configured user agent
//! - Classifying each attempt as success, error status, or network failure
//! - Retrying network failures with exponential backoff
//!
//! Failure is a value here, never an error: callers get a `FetchOutcome`
//! with `success == false` and an empty body.

use crate::config::{ScannerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;

/// Redirect hops followed before a request is abandoned
const MAX_REDIRECTS: usize = 10;

/// Upper bound for the connect phase, regardless of the request timeout
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a fetch: the body on success, empty otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Response body text (empty when `success` is false)
    pub body: String,

    /// Whether a response with status < 400 was received
    pub success: bool,
}

impl FetchOutcome {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            success: true,
        }
    }

    pub fn failed() -> Self {
        Self {
            body: String::new(),
            success: false,
        }
    }
}

/// Classification of a single request attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Status < 400, body read completely
    Success(String),

    /// Status >= 400; terminal, not retried
    HttpStatus(u16),

    /// Connection failure, timeout, or broken body; retried
    Network(String),

    /// The request could not be issued at all (bad URL, redirect loop); not retried
    Rejected(String),
}

/// Attempt limit and backoff schedule for network failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per URL (at least 1)
    pub max_attempts: u32,

    /// Wait before the second attempt; doubled for each later one
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_backoff())
    }

    /// Wait after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_backoff.saturating_mul(factor)
    }

    /// Sum of all waits when every attempt fails
    ///
    /// No wait follows the final attempt.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|attempt| self.backoff_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Runs `attempt` under `policy` until it succeeds, hits a terminal
/// outcome, or runs out of attempts
///
/// # Retry Logic
///
/// | Attempt outcome | Action |
/// |-----------------|--------|
/// | Success | Return body, `success = true` |
/// | HTTP status >= 400 | Return immediately, `success = false` |
/// | Rejected request | Return immediately, `success = false` |
/// | Network error | Sleep `backoff_for(attempt)`, try again |
/// | Network error on last attempt | Return `success = false` |
pub async fn retry_fetch<F, Fut>(url: &str, policy: &RetryPolicy, mut attempt: F) -> FetchOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AttemptOutcome>,
{
    let attempts = policy.max_attempts.max(1);

    for n in 1..=attempts {
        match attempt().await {
            AttemptOutcome::Success(body) => {
                tracing::debug!("Fetched {} successfully (attempt {})", url, n);
                return FetchOutcome::ok(body);
            }
            AttemptOutcome::HttpStatus(status) => {
                tracing::warn!("{} returned status {}", url, status);
                return FetchOutcome::failed();
            }
            AttemptOutcome::Rejected(reason) => {
                tracing::warn!("Request to {} rejected: {}", url, reason);
                return FetchOutcome::failed();
            }
            AttemptOutcome::Network(error) => {
                if n < attempts {
                    let wait = policy.backoff_for(n);
                    tracing::warn!(
                        "Attempt {}/{}: error fetching {}: {} (retrying in {:?})",
                        n,
                        attempts,
                        url,
                        error,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                } else {
                    tracing::warn!("Attempt {}/{}: error fetching {}: {}", n, attempts, url, error);
                }
            }
        }
    }

    tracing::error!("Failed to fetch {} after {} attempts", url, attempts);
    FetchOutcome::failed()
}

/// Anything that can retrieve a URL's body
///
/// The crawler is generic over this so sitemap resolution and page scanning
/// can run against something other than the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `scanner` - Scanner settings (timeout and pool sizing)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use tracebound::config::Config;
/// use tracebound::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent, &config.scanner).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    scanner: &ScannerConfig,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml"),
    );

    let timeout = scanner.timeout();

    Client::builder()
        .user_agent(user_agent.header_value())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .pool_max_idle_per_host(scanner.concurrency as usize)
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(client: Client, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            retry,
        }
    }

    /// Issues a single GET and classifies the result
    async fn attempt(&self, url: &str) -> AttemptOutcome {
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            return AttemptOutcome::HttpStatus(status.as_u16());
        }

        match response.text().await {
            Ok(body) => AttemptOutcome::Success(body),
            Err(e) => classify_error(&e),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        retry_fetch(url, &self.retry, || self.attempt(url)).await
    }
}

/// Maps a reqwest error onto a retryable or terminal attempt outcome
fn classify_error(e: &reqwest::Error) -> AttemptOutcome {
    if e.is_builder() || e.is_redirect() {
        AttemptOutcome::Rejected(e.to_string())
    } else if e.is_timeout() {
        AttemptOutcome::Network("Request timeout".to_string())
    } else if e.is_connect() {
        AttemptOutcome::Network(format!("Connection failed: {}", e))
    } else {
        AttemptOutcome::Network(e.to_string())
    }
}
