use crate::UrlError;
use url::Url;

/// Sitemap locations tried under every base URL
pub const SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml"];

/// Parses and validates a scheme-qualified base URL
///
/// Only `http` and `https` are accepted, and the URL must carry a host.
///
/// # Examples
///
/// ```
/// use tracebound::url::parse_base_url;
///
/// let url = parse_base_url("https://example.com/").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
/// assert!(parse_base_url("ftp://example.com").is_err());
/// ```
pub fn parse_base_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Renders a base URL without its trailing slash, ready for path appending
///
/// ```
/// use tracebound::url::{base_url_string, parse_base_url};
///
/// let url = parse_base_url("https://example.com/blog/").unwrap();
/// assert_eq!(base_url_string(&url), "https://example.com/blog");
/// ```
pub fn base_url_string(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

/// Builds the seed sitemap URLs for a base URL
///
/// The paths are appended verbatim, so a base with a path prefix keeps it.
pub fn sitemap_seeds(base: &str) -> Vec<String> {
    let base = base.trim_end_matches('/');
    SITEMAP_PATHS
        .iter()
        .map(|path| format!("{}{}", base, path))
        .collect()
}
