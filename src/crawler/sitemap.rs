//! Sitemap resolution
//!
//! This module handles:
//! - Parsing sitemap and sitemap-index XML into `<loc>` values
//! - Telling nested sitemaps apart from page URLs
//! - Walking the sitemap tree concurrently without fetching any node twice
//!
//! A node that cannot be fetched or parsed contributes nothing; its siblings
//! are unaffected.

use crate::crawler::fetcher::PageFetcher;
use futures::future::{join_all, BoxFuture, FutureExt};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Namespace every sitemap `<loc>` element must be in
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Errors that make a sitemap document unusable
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document has no root element")]
    NoRootElement,

    #[error("unclosed element at end of document")]
    Unclosed,

    #[error("content after the root element")]
    TrailingContent,
}

/// Extracts the `<loc>` values of a sitemap or sitemap index
///
/// Only `loc` elements bound to [`SITEMAP_NAMESPACE`] count. Values are
/// trimmed and empty ones dropped. Order follows the document.
///
/// # Returns
///
/// * `Ok(Vec<String>)` - The `<loc>` values
/// * `Err(SitemapError)` - The document is not well-formed XML
///
/// # Example
///
/// ```
/// use tracebound::crawler::parse_sitemap;
///
/// let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc> https://example.com/a </loc></url>
/// </urlset>"#;
/// assert_eq!(parse_sitemap(xml).unwrap(), vec!["https://example.com/a"]);
/// ```
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, SitemapError> {
    let mut reader = NsReader::from_str(xml);

    let mut locs = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_resolved_event()? {
            (_, Event::Start(_) | Event::Empty(_)) if saw_root && depth == 0 => {
                return Err(SitemapError::TrailingContent);
            }
            (_, Event::Text(text))
                if saw_root && depth == 0 && !text.iter().all(u8::is_ascii_whitespace) =>
            {
                return Err(SitemapError::TrailingContent);
            }
            (ns, Event::Start(e)) => {
                depth += 1;
                saw_root = true;
                if is_sitemap_ns(&ns) && e.local_name().as_ref() == b"loc" {
                    in_loc = true;
                    current.clear();
                }
            }
            (_, Event::Empty(_)) => saw_root = true,
            (_, Event::End(e)) => {
                depth = depth.saturating_sub(1);
                if in_loc && e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                    let value = current.trim();
                    if !value.is_empty() {
                        locs.push(value.to_string());
                    }
                }
            }
            (_, Event::Text(text)) if in_loc => current.push_str(&text.unescape()?),
            (_, Event::CData(data)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&data.into_inner()))
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(SitemapError::NoRootElement);
    }
    if depth != 0 {
        return Err(SitemapError::Unclosed);
    }

    Ok(locs)
}

fn is_sitemap_ns(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SITEMAP_NAMESPACE.as_bytes())
}

/// Whether a `<loc>` value points at another sitemap rather than a page
pub fn is_nested_sitemap(loc: &str) -> bool {
    loc.to_lowercase().contains("sitemap")
}

/// Set of sitemap URLs already claimed by some branch of a resolution
///
/// `insert` is the only way in, so check-and-add is a single atomic step.
#[derive(Debug, Clone, Default)]
pub struct SitemapVisitSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl SitemapVisitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url`; returns false if some branch already had it
    pub fn insert(&self, url: &str) -> bool {
        let mut visited = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        visited.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        let visited = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        visited.contains(url)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flattens a sitemap tree into the set of page URLs it lists
///
/// The visit set lives as long as the resolver, so resolving the same seeds
/// a second time fetches nothing.
pub struct SitemapResolver<F> {
    fetcher: Arc<F>,
    visited: SitemapVisitSet,
}

impl<F: PageFetcher> SitemapResolver<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            visited: SitemapVisitSet::new(),
        }
    }

    /// Resolves every seed concurrently and returns the union of page URLs
    ///
    /// An empty set means nothing could be fetched or parsed; that is a
    /// normal outcome, not an error.
    pub async fn resolve(&self, seeds: &[String]) -> HashSet<String> {
        let branches = seeds.iter().map(|seed| self.resolve_node(seed.clone()));

        let mut pages = HashSet::new();
        for found in join_all(branches).await {
            pages.extend(found);
        }
        pages
    }

    pub fn visited(&self) -> &SitemapVisitSet {
        &self.visited
    }

    fn resolve_node(&self, url: String) -> BoxFuture<'_, HashSet<String>> {
        async move {
            if !self.visited.insert(&url) {
                tracing::debug!("Already visited sitemap: {}", url);
                return HashSet::new();
            }

            tracing::info!("Parsing sitemap: {}", url);
            let outcome = self.fetcher.fetch(&url).await;
            if !outcome.success {
                tracing::warn!("Could not retrieve sitemap {}", url);
                return HashSet::new();
            }

            let locs = match parse_sitemap(&outcome.body) {
                Ok(locs) => locs,
                Err(e) => {
                    tracing::warn!("XML parse error at {}: {}", url, e);
                    return HashSet::new();
                }
            };

            let (nested, pages): (Vec<String>, Vec<String>) =
                locs.into_iter().partition(|loc| is_nested_sitemap(loc));

            tracing::debug!(
                "{}: {} page URLs, {} nested sitemaps",
                url,
                pages.len(),
                nested.len()
            );

            let mut found: HashSet<String> = pages.into_iter().collect();
            let children = join_all(nested.into_iter().map(|loc| self.resolve_node(loc))).await;
            for child in children {
                found.extend(child);
            }

            found
        }
        .boxed()
    }
}
