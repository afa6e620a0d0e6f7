//! Crawl results written to disk in each output format

use std::time::Duration;
use tempfile::TempDir;
use tracebound::config::Config;
use tracebound::crawler::{run_crawl, CrawlTarget};
use tracebound::output::{writer_for, OutputFormat};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn crawl_two_matches() -> Vec<String> {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{0}/a</loc></url>
  <url><loc>{0}/b</loc></url>
  <url><loc>{0}/c</loc></url>
</urlset>"#,
        base_url
    );

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    for (route, body) in [("/a", "Proof here"), ("/b", "also proof"), ("/c", "nope")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("<p>{}</p>", body)))
            .mount(&mock_server)
            .await;
    }

    let target =
        CrawlTarget::new(&base_url, "proof", false, 2, Duration::from_secs(5)).expect("target");
    let report = run_crawl(target, &Config::default()).await.expect("crawl");

    let mut matches = report.matches;
    matches.sort();
    assert_eq!(
        matches,
        vec![format!("{}/a", base_url), format!("{}/b", base_url)]
    );
    matches
}

#[tokio::test]
async fn test_txt_results_file() {
    let matches = crawl_two_matches().await;
    let dir = TempDir::new().unwrap();

    let path = writer_for(OutputFormat::Txt)
        .write_file(&matches, dir.path())
        .unwrap();

    let file_name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("results_"));
    assert!(file_name.ends_with(".txt"));

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, matches.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_json_results_file() {
    let matches = crawl_two_matches().await;
    let dir = TempDir::new().unwrap();

    let path = writer_for(OutputFormat::Json)
        .write_file(&matches, dir.path())
        .unwrap();
    assert_eq!(path.extension().unwrap(), "json");

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let found: Vec<String> = value["found_urls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(found, matches);
}

#[tokio::test]
async fn test_csv_results_file() {
    let matches = crawl_two_matches().await;
    let dir = TempDir::new().unwrap();

    let path = writer_for(OutputFormat::Csv)
        .write_file(&matches, dir.path())
        .unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    assert_eq!(reader.headers().unwrap().get(0), Some("URL"));

    let rows: Vec<String> = reader
        .records()
        .map(|r| r.unwrap().get(0).unwrap().to_string())
        .collect();
    assert_eq!(rows, matches);
}
