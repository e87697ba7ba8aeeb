use std::time::Duration;

use httpmock::prelude::*;
use lampstand::analysis::{collect, Generator, OllamaGenerator};
use lampstand::app::LampstandError;
use lampstand::scraper::{Extractor, ExtractorConfig, HttpExtractor};
use serde_json::json;

const ARTICLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Fallback title</title>
  <meta property="og:title" content="Valley floods recede">
  <meta property="og:description" content="Water levels fall after a week.">
  <meta property="og:image" content="https://img.example/flood.jpg">
  <meta property="article:published_time" content="2024-03-01T09:00:00Z">
  <script>var tracking = "remove me";</script>
</head>
<body>
  <nav>Home | World | Science</nav>
  <article>
    <p>After seven days of rain, the river returned to its banks.</p>
    <p>Residents began clearing mud from their homes on Friday.</p>
  </article>
</body>
</html>"#;

fn extractor(min_content_length: usize) -> HttpExtractor {
    HttpExtractor::new(&ExtractorConfig {
        min_content_length,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_extracts_article_region_and_metadata() {
    let server = MockServer::start_async().await;
    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/floods");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(ARTICLE_PAGE);
        })
        .await;

    let extraction = extractor(50).extract(&server.url("/floods")).await.unwrap();

    page.assert_async().await;
    assert!(extraction.content.contains("the river returned to its banks"));
    assert!(!extraction.content.contains("Home | World"));
    assert!(!extraction.content.contains("tracking"));
    assert_eq!(extraction.title.as_deref(), Some("Valley floods recede"));
    assert_eq!(
        extraction.description.as_deref(),
        Some("Water levels fall after a week.")
    );
    assert_eq!(extraction.image.as_deref(), Some("https://img.example/flood.jpg"));
    assert_eq!(extraction.published.as_deref(), Some("2024-03-01T09:00:00Z"));
}

#[tokio::test]
async fn test_forbidden_page_is_paywalled() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/subscriber-only");
            then.status(403).body("Subscribe to continue");
        })
        .await;

    let result = extractor(50).extract(&server.url("/subscriber-only")).await;

    assert!(matches!(result, Err(LampstandError::Paywalled(_))));
}

#[tokio::test]
async fn test_short_page_is_extraction_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/stub");
            then.status(200).body("<html><body><p>Too short.</p></body></html>");
        })
        .await;

    let result = extractor(200).extract(&server.url("/stub")).await;

    assert!(matches!(result, Err(LampstandError::Extraction(_))));
}

#[tokio::test]
async fn test_generator_streams_ndjson_tokens() {
    let server = MockServer::start_async().await;
    let body = [
        json!({"response": "{\"themes\":", "done": false}),
        json!({"response": "[]}", "done": false}),
        json!({"response": "", "done": true}),
    ]
    .iter()
    .map(|line| line.to_string())
    .collect::<Vec<_>>()
    .join("\n");

    let generate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .json_body_partial(r#"{"model": "test-model", "stream": true}"#);
            then.status(200)
                .header("content-type", "application/x-ndjson")
                .body(body);
        })
        .await;

    let generator =
        OllamaGenerator::new(&server.base_url(), "test-model", Duration::from_secs(5)).unwrap();
    let tokens = generator.generate("Analyze this").await.unwrap();
    let text = collect(tokens).await.unwrap();

    generate.assert_async().await;
    assert_eq!(text, r#"{"themes":[]}"#);
}

#[tokio::test]
async fn test_generator_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(404).body(r#"{"error":"model not found"}"#);
        })
        .await;

    let generator =
        OllamaGenerator::new(&server.base_url(), "missing", Duration::from_secs(5)).unwrap();
    let result = generator.generate("Analyze this").await;

    assert!(matches!(result, Err(LampstandError::Generation(_))));
}
