//! Pre-flight network checks
//!
//! None of these are part of the crawl itself; they run once before it to
//! pick a scheme for bare domains and to fail fast when offline.

use crate::url::normalize::{base_url_string, parse_base_url};
use crate::UrlError;
use reqwest::Client;
use std::time::Duration;

/// Host used for the connectivity check
const CONNECTIVITY_PROBE_URL: &str = "https://www.google.com";

/// Timeout for every probe request
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Turns user input into a scheme-qualified base URL
///
/// Input that already starts with `http://` or `https://` is validated and
/// returned without its trailing slash. A bare domain is probed over HTTPS
/// first; if that request fails or answers with status >= 400 the HTTP form
/// is used instead.
///
/// # Returns
///
/// * `Ok(String)` - Base URL without trailing slash
/// * `Err(UrlError)` - The input cannot form a valid URL
pub async fn resolve_base_url(client: &Client, input: &str) -> Result<String, UrlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Empty);
    }

    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        let url = parse_base_url(input)?;
        return Ok(base_url_string(&url));
    }

    let https = parse_base_url(&format!("https://{}", input))?;
    let https = base_url_string(&https);

    match client.get(&https).timeout(PROBE_TIMEOUT).send().await {
        Ok(response) if response.status().as_u16() < 400 => {
            tracing::debug!("{} answered over HTTPS", input);
            return Ok(https);
        }
        Ok(response) => {
            tracing::debug!(
                "{} answered over HTTPS with status {}, falling back to HTTP",
                input,
                response.status()
            );
        }
        Err(e) => {
            tracing::debug!("HTTPS probe for {} failed ({}), falling back to HTTP", input, e);
        }
    }

    let http = parse_base_url(&format!("http://{}", input))?;
    Ok(base_url_string(&http))
}

/// Checks that the machine can reach the internet at all
pub async fn check_connectivity(client: &Client) -> bool {
    match client
        .get(CONNECTIVITY_PROBE_URL)
        .timeout(PROBE_TIMEOUT)
        .send()
        .await
    {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Connectivity probe failed: {}", e);
            false
        }
    }
}

/// Returns true if `host` resolves to at least one address
pub async fn resolves_to_address(host: &str) -> bool {
    match tokio::net::lookup_host((host, 80)).await {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => {
                tracing::debug!("{} resolves to {}", host, addr.ip());
                true
            }
            None => false,
        },
        Err(e) => {
            tracing::debug!("DNS lookup for {} failed: {}", host, e);
            false
        }
    }
}
