use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use lampstand::aggregator::{FeedAggregator, FeedCatalog};
use lampstand::app::LampstandError;
use lampstand::domain::{Category, FeedEntry, FeedSource};
use lampstand::fetcher::http_fetcher::{HttpFetcher, DEFAULT_USER_AGENT};
use lampstand::fetcher::parallel::ParallelFetcher;
use lampstand::fetcher::Fetcher;
use lampstand::scraper::{Enricher, ExtractorConfig, HttpExtractor};
use lampstand::store::{ArticleCache, SqliteStore};

const UNSORTED_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Mock Science</title>
    <item>
      <title>Middle</title>
      <link>https://science.example/middle</link>
      <pubDate>Tue, 02 Jan 2024 08:00:00 GMT</pubDate>
      <description>second</description>
    </item>
    <item>
      <title>Oldest</title>
      <link>https://science.example/oldest</link>
      <pubDate>Mon, 01 Jan 2024 08:00:00 GMT</pubDate>
      <description>first</description>
    </item>
    <item>
      <title>Newest</title>
      <link>https://science.example/newest</link>
      <pubDate>Wed, 03 Jan 2024 08:00:00 GMT</pubDate>
      <description>third</description>
    </item>
  </channel>
</rss>"#;

fn http_fetcher() -> Arc<dyn Fetcher + Send + Sync> {
    Arc::new(HttpFetcher::new(Duration::from_secs(5), DEFAULT_USER_AGENT).unwrap())
}

#[tokio::test]
async fn test_http_fetcher_non_ok_status_is_transport_failure() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/broken.xml");
            then.status(500);
        })
        .await;

    let result = http_fetcher().fetch(&server.url("/broken.xml")).await;

    mock.assert_async().await;
    assert!(matches!(result, Err(LampstandError::Transport(_))));
}

#[tokio::test]
async fn test_aggregate_survives_failing_source() {
    let server = MockServer::start_async().await;
    let broken = server
        .mock_async(|when, then| {
            when.method(GET).path("/broken.xml");
            then.status(500);
        })
        .await;
    let healthy = server
        .mock_async(|when, then| {
            when.method(GET).path("/science.xml");
            then.status(200)
                .header("content-type", "application/rss+xml")
                .body(UNSORTED_RSS);
        })
        .await;

    let mut catalog = FeedCatalog::builtin();
    catalog.set_feeds(
        Category::Science,
        vec![
            FeedSource::new(server.url("/broken.xml")),
            FeedSource::new(server.url("/science.xml")),
        ],
    );
    let aggregator = FeedAggregator::new(
        ParallelFetcher::new(http_fetcher(), Duration::from_secs(5)),
        catalog,
    );

    let entries = aggregator.aggregate("science").await;

    broken.assert_async().await;
    healthy.assert_async().await;
    let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
    assert!(entries.iter().all(|e| e.source == "Mock Science"));
    assert!(entries.iter().all(|e| e.image_url.is_some()));
}

#[tokio::test]
async fn test_aggregate_times_out_slow_source() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/slow.xml");
            then.status(200)
                .delay(Duration::from_secs(2))
                .body(UNSORTED_RSS);
        })
        .await;

    let mut catalog = FeedCatalog::builtin();
    catalog.set_feeds(
        Category::Usa,
        vec![FeedSource::new(server.url("/slow.xml"))],
    );
    let aggregator = FeedAggregator::new(
        ParallelFetcher::new(http_fetcher(), Duration::from_millis(200)),
        catalog,
    );

    let aggregation = aggregator.aggregate_category(Category::Usa).await;

    assert!(aggregation.entries.is_empty());
    assert_eq!(aggregation.failures.len(), 1);
    assert!(aggregation.failures[0].1.is_transport());
}

#[tokio::test]
async fn test_enrichment_never_retries_a_paywalled_article() {
    let server = MockServer::start_async().await;
    let paywall = server
        .mock_async(|when, then| {
            when.method(GET).path("/paywalled");
            then.status(403).body("Forbidden");
        })
        .await;

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let extractor = HttpExtractor::new(&ExtractorConfig::default()).unwrap();
    let enricher = Enricher::new(store.clone(), Arc::new(extractor), Duration::from_secs(5));
    let entry = FeedEntry::new("Locked story", server.url("/paywalled"));

    let first = enricher.enrich(entry.clone(), Category::Israel).await;
    let second = enricher.enrich(entry, Category::Israel).await;

    assert!(first.extraction_failed);
    assert!(second.extraction_failed);
    assert_eq!(paywall.hits_async().await, 1);

    let record = store
        .get_article_by_url(&server.url("/paywalled"))
        .unwrap()
        .unwrap();
    assert!(record.extraction_failed);
    assert_eq!(record.category, "israel");
}

#[tokio::test]
async fn test_enrichment_caches_extracted_article() {
    let server = MockServer::start_async().await;
    let body = format!(
        r#"<html><head>
<meta property="og:image" content="https://img.example/lead.jpg">
</head><body><article><p>{}</p></article></body></html>"#,
        "Researchers observed a comet. ".repeat(20)
    );
    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/story");
            then.status(200).header("content-type", "text/html").body(&body);
        })
        .await;

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let extractor = HttpExtractor::new(&ExtractorConfig::default()).unwrap();
    let enricher = Enricher::new(store.clone(), Arc::new(extractor), Duration::from_secs(5));
    let entry = FeedEntry::new("Comet", server.url("/story"));

    let first = enricher.enrich(entry.clone(), Category::Science).await;
    let second = enricher.enrich(entry, Category::Science).await;

    assert!(!first.extraction_failed);
    assert!(first.full_content.as_deref().unwrap().contains("Researchers observed a comet."));
    assert_eq!(first.entry.image_url.as_deref(), Some("https://img.example/lead.jpg"));
    assert_eq!(second.full_content, first.full_content);
    assert_eq!(page.hits_async().await, 1);
}
