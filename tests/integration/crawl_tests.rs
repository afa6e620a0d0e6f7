//! End-to-end crawl tests against mock HTTP servers

use std::time::Duration;
use tracebound::config::Config;
use tracebound::crawler::{run_crawl, CrawlTarget};
use tracebound::url::resolve_base_url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration with a short retry schedule so failing fetches end quickly
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.scanner.retry_attempts = 2;
    config.scanner.retry_backoff_ms = 10;
    config
}

fn create_target(base_url: &str, phrase: &str, is_regex: bool, concurrency: usize) -> CrawlTarget {
    CrawlTarget::new(base_url, phrase, is_regex, concurrency, Duration::from_secs(5))
        .expect("valid target")
}

fn urlset(locs: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for loc in locs {
        xml.push_str(&format!("\n  <url><loc>{}</loc></url>", loc));
    }
    xml.push_str("\n</urlset>");
    xml
}

fn sitemap_index(locs: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for loc in locs {
        xml.push_str(&format!("\n  <sitemap><loc>{}</loc></sitemap>", loc));
    }
    xml.push_str("\n</sitemapindex>");
    xml
}

fn html(body: &str) -> String {
    format!(
        "<html><head><title>Test</title><script>var hidden = 'proof';</script></head><body>{}</body></html>",
        body
    )
}

async fn mount_get(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// A URL on a port nothing listens on, so fetching it is a network error
fn unreachable_url(page: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/{}", addr, page)
}

fn sorted(mut urls: Vec<String>) -> Vec<String> {
    urls.sort();
    urls
}

#[tokio::test]
async fn test_end_to_end_nested_sitemap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(
        &mock_server,
        "/sitemap.xml",
        200,
        urlset(&[format!("{}/sitemap_a.xml", base_url), format!("{}/p1", base_url)]),
    )
    .await;
    mount_get(
        &mock_server,
        "/sitemap_a.xml",
        200,
        urlset(&[format!("{}/p2", base_url)]),
    )
    .await;
    mount_get(&mock_server, "/sitemap_index.xml", 404, String::new()).await;
    mount_get(&mock_server, "/p1", 200, html("<p>Welcome, proof delivered</p>")).await;
    mount_get(&mock_server, "/p2", 200, html("<p>nothing here</p>")).await;

    let target = create_target(&base_url, "proof", false, 4);
    let report = run_crawl(target, &create_test_config())
        .await
        .expect("crawl runs");

    assert_eq!(report.matches, vec![format!("{}/p1", base_url)]);
    assert_eq!(report.pages_discovered, 2);
    assert_eq!(report.pages_scanned, 2);
    assert_eq!(report.pages_failed, 0);
}

#[tokio::test]
async fn test_cyclic_sitemap_index_fetched_once_per_node() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // sitemap_index.xml -> sitemap_posts.xml -> sitemap_index.xml (cycle)
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_index(&[
            format!("{}/sitemap_posts.xml", base_url),
            format!("{}/sitemap_pages.xml", base_url),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap_posts.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[
            format!("{}/sitemap_index.xml", base_url),
            format!("{}/posts/1", base_url),
            format!("{}/about", base_url),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap_pages.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[
            format!("{}/about", base_url),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Every page is scanned exactly once even though /about is listed twice
    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("Proof of stake")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("About us")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = create_target(&base_url, "proof", false, 3);
    let report = run_crawl(target, &create_test_config())
        .await
        .expect("crawl runs");

    assert_eq!(report.pages_discovered, 2);
    assert_eq!(report.matches, vec![format!("{}/posts/1", base_url)]);

    // Expectations are verified when the server drops
}

#[tokio::test]
async fn test_partial_failures_do_not_abort_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let mut pages: Vec<String> = (0..7).map(|i| format!("{}/page/{}", base_url, i)).collect();
    let broken: Vec<String> = (0..3).map(|i| unreachable_url(&format!("gone{}", i))).collect();
    pages.extend(broken.iter().cloned());

    mount_get(&mock_server, "/sitemap.xml", 200, urlset(&pages)).await;
    mount_get(&mock_server, "/sitemap_index.xml", 404, String::new()).await;

    let mut expected = Vec::new();
    for i in 0..7 {
        let body = if i % 2 == 0 {
            expected.push(format!("{}/page/{}", base_url, i));
            html("<div>the PROOF is in the pudding</div>")
        } else {
            html("<div>no luck</div>")
        };
        mount_get(&mock_server, &format!("/page/{}", i), 200, body).await;
    }

    let target = create_target(&base_url, "proof", false, 4);
    let report = run_crawl(target, &create_test_config())
        .await
        .expect("crawl runs");

    assert_eq!(report.pages_discovered, 10);
    assert_eq!(report.pages_scanned, 10);
    assert_eq!(report.pages_failed, 3);
    assert_eq!(sorted(report.matches), sorted(expected));
}

#[tokio::test]
async fn test_http_error_pages_are_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let pages = vec![format!("{}/ok", base_url), format!("{}/forbidden", base_url)];
    mount_get(&mock_server, "/sitemap.xml", 200, urlset(&pages)).await;
    mount_get(&mock_server, "/sitemap_index.xml", 404, String::new()).await;
    mount_get(&mock_server, "/ok", 200, html("proof")).await;

    Mock::given(method("GET"))
        .and(path("/forbidden"))
        .respond_with(ResponseTemplate::new(403).set_body_string(html("proof")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = create_target(&base_url, "proof", false, 2);
    let report = run_crawl(target, &create_test_config())
        .await
        .expect("crawl runs");

    assert_eq!(report.matches, vec![format!("{}/ok", base_url)]);
    assert_eq!(report.pages_failed, 1);
}

#[tokio::test]
async fn test_malformed_sitemap_does_not_block_other_seed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(
        &mock_server,
        "/sitemap.xml",
        200,
        "<urlset><url><loc>broken".to_string(),
    )
    .await;
    mount_get(
        &mock_server,
        "/sitemap_index.xml",
        200,
        urlset(&[format!("{}/found", base_url)]),
    )
    .await;
    mount_get(&mock_server, "/found", 200, html("pr0of")).await;

    let target = create_target(&base_url, "pr[o0]+of", true, 2);
    let report = run_crawl(target, &create_test_config())
        .await
        .expect("crawl runs");

    assert_eq!(report.matches, vec![format!("{}/found", base_url)]);
}

#[tokio::test]
async fn test_no_sitemaps_means_nothing_scanned() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;

    let target = create_target(&base_url, "proof", false, 2);
    let report = run_crawl(target, &create_test_config())
        .await
        .expect("crawl runs");

    assert!(report.nothing_scanned());
    assert!(report.matches.is_empty());
}

#[tokio::test]
async fn test_many_pages_under_small_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let pages: Vec<String> = (0..120).map(|i| format!("{}/item/{}", base_url, i)).collect();
    mount_get(&mock_server, "/sitemap.xml", 200, urlset(&pages)).await;
    mount_get(&mock_server, "/sitemap_index.xml", 404, String::new()).await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html("proof"))
                .set_delay(Duration::from_millis(5)),
        )
        .mount(&mock_server)
        .await;

    let target = create_target(&base_url, "proof", false, 5);
    let report = run_crawl(target, &create_test_config())
        .await
        .expect("crawl runs");

    assert_eq!(report.pages_discovered, 120);
    assert_eq!(report.matches.len(), 120);
    assert_eq!(report.pages_failed, 0);
}

#[tokio::test]
async fn test_bare_domain_falls_back_to_http() {
    let mock_server = MockServer::start().await;
    let address = mock_server.address().to_string();

    // The mock server only speaks plain HTTP, so the HTTPS probe fails
    let client = reqwest::Client::new();
    let base = resolve_base_url(&client, &address)
        .await
        .expect("resolvable");

    assert_eq!(base, format!("http://{}", address));
}
