//! Per-page scanning: fetch, extract visible text, test against the phrase

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::matcher::PhraseMatcher;
use crate::crawler::parser::extract_visible_text;
use std::sync::Arc;

/// Outcome of scanning one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// The page URL
    pub url: String,

    /// Whether the phrase was found
    pub matched: bool,

    /// Whether the page body was retrieved at all
    pub fetched: bool,
}

impl MatchResult {
    fn unfetched(url: &str) -> Self {
        Self {
            url: url.to_string(),
            matched: false,
            fetched: false,
        }
    }
}

/// Scans pages for a phrase
///
/// Retries happen inside the fetcher; a failed fetch here is final and the
/// page simply does not match.
pub struct PageScanner<F> {
    fetcher: Arc<F>,
    matcher: Arc<PhraseMatcher>,
}

impl<F: PageFetcher> PageScanner<F> {
    pub fn new(fetcher: Arc<F>, matcher: Arc<PhraseMatcher>) -> Self {
        Self { fetcher, matcher }
    }

    pub async fn scan(&self, url: &str) -> MatchResult {
        let outcome = self.fetcher.fetch(url).await;
        if !outcome.success {
            tracing::warn!("Skipping {}: page could not be fetched", url);
            return MatchResult::unfetched(url);
        }

        let text = extract_visible_text(&outcome.body);
        let matched = self.matcher.matches(&text);

        if matched {
            tracing::info!("Phrase found at: {}", url);
        } else {
            tracing::debug!("Phrase not found at: {}", url);
        }

        MatchResult {
            url: url.to_string(),
            matched,
            fetched: true,
        }
    }
}
