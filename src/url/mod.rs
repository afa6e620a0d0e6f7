//! URL handling module for Tracebound
//!
//! This module turns whatever the user typed into a scheme-qualified base
//! URL, derives the conventional sitemap locations from it, and provides the
//! pre-flight network checks (connectivity and DNS) run before a crawl.

mod normalize;
mod probe;

pub use normalize::{base_url_string, parse_base_url, sitemap_seeds, SITEMAP_PATHS};
pub use probe::{check_connectivity, resolve_base_url, resolves_to_address};
