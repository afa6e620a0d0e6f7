//! Global concurrency limiting
//!
//! One counting semaphore bounds every in-flight fetch of a crawl. Sitemap
//! resolution takes a permit per fetch through `LimitedFetcher`; page
//! scanning takes a permit before a scan task is spawned and keeps it until
//! the task finishes. The two phases run one after the other, so the same
//! limit covers both.

use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Shared counting semaphore sized by the configured concurrency limit
#[derive(Debug, Clone)]
pub struct ConcurrencyLimit {
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyLimit {
    /// Creates a limit of `limit` slots (at least one)
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit.max(1))),
        }
    }

    /// Waits for a free slot, held until the permit is dropped
    ///
    /// The semaphore is never closed, so this only yields `None` if that
    /// invariant is broken; callers then proceed without a slot.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await;
        if let Err(e) = &permit {
            tracing::error!("Concurrency limit unavailable: {}", e);
        }
        permit.ok()
    }
}

/// A `PageFetcher` that holds a slot of a `ConcurrencyLimit` for the
/// duration of each fetch
pub struct LimitedFetcher<F> {
    inner: Arc<F>,
    limit: ConcurrencyLimit,
}

impl<F> LimitedFetcher<F> {
    pub fn new(inner: Arc<F>, limit: ConcurrencyLimit) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for LimitedFetcher<F> {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let _permit = self.limit.acquire().await;
        self.inner.fetch(url).await
    }
}
