//! Per-category news aggregation.
//!
//! Fetches every source of a category concurrently, merges their entries,
//! removes duplicates, fills in missing images and keeps the newest page.

pub mod catalog;

pub use catalog::FeedCatalog;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::app::LampstandError;
use crate::domain::{Category, FeedEntry};
use crate::fetcher::Fetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::normalizer::Normalizer;

/// Maximum number of entries returned for one category.
pub const PAGE_SIZE: usize = 10;

/// Result of one aggregation run.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub entries: Vec<FeedEntry>,
    /// Source URLs that contributed nothing, with the reason.
    pub failures: Vec<(String, LampstandError)>,
    pub total_sources: usize,
}

impl Aggregation {
    /// `PartialFailure` describing the failed sources, if any failed.
    pub fn partial_failure(&self) -> Option<LampstandError> {
        if self.failures.is_empty() {
            None
        } else {
            Some(LampstandError::PartialFailure {
                failed: self.failures.len(),
                total: self.total_sources,
            })
        }
    }
}

pub struct FeedAggregator {
    fetcher: ParallelFetcher,
    normalizer: Normalizer,
    catalog: FeedCatalog,
}

impl FeedAggregator {
    pub fn new(fetcher: ParallelFetcher, catalog: FeedCatalog) -> Self {
        Self {
            fetcher,
            normalizer: Normalizer::new(),
            catalog,
        }
    }

    /// Aggregator over `fetcher` with the default fan-out.
    pub fn with_fetcher(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        catalog: FeedCatalog,
        timeout: Duration,
    ) -> Self {
        Self::new(ParallelFetcher::new(fetcher, timeout), catalog)
    }

    pub fn catalog(&self) -> &FeedCatalog {
        &self.catalog
    }

    /// Newest entries for a category slug. Unknown slugs yield an empty list.
    pub async fn aggregate(&self, category: &str) -> Vec<FeedEntry> {
        match category.parse::<Category>() {
            Ok(category) => self.aggregate_category(category).await.entries,
            Err(_) => {
                tracing::debug!("Unknown category '{}'", category);
                Vec::new()
            }
        }
    }

    pub async fn aggregate_category(&self, category: Category) -> Aggregation {
        let sources = self.catalog.feeds(category).to_vec();
        let total_sources = sources.len();

        let results = self.fetcher.fetch_all(sources, &self.normalizer).await;

        let mut combined = Vec::new();
        let mut failures = Vec::new();
        for (source, result) in results {
            match result {
                Ok(entries) => combined.extend(entries),
                Err(e) => {
                    tracing::warn!("Source {} failed: {}", source.url, e);
                    failures.push((source.url, e));
                }
            }
        }

        let entries = finalize(combined, self.catalog.fallback_image(category));

        let aggregation = Aggregation {
            entries,
            failures,
            total_sources,
        };

        if let Some(partial) = aggregation.partial_failure() {
            tracing::warn!("{}: {}", category, partial);
        }
        tracing::info!(
            "Aggregated {} entries for {}",
            aggregation.entries.len(),
            category
        );

        aggregation
    }
}

/// Dedupe, fill missing images, sort newest first and cut to a page.
///
/// Entries without a usable date (missing or unparsable in the feed) sort as
/// the oldest; the sort is stable so they keep their merged order.
fn finalize(entries: Vec<FeedEntry>, fallback_image: &str) -> Vec<FeedEntry> {
    let mut entries = dedupe(entries);

    for entry in entries.iter_mut() {
        if entry.image_url.as_deref().is_none_or(str::is_empty) {
            entry.image_url = Some(fallback_image.to_string());
        }
    }

    entries.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    entries.truncate(PAGE_SIZE);
    entries
}

/// Two entries are the same if their normalized titles OR their links match.
/// An entry is kept only when no earlier entry, kept or dropped, matches it.
fn dedupe(entries: Vec<FeedEntry>) -> Vec<FeedEntry> {
    let mut seen_titles = HashSet::new();
    let mut seen_links = HashSet::new();

    entries
        .into_iter()
        .filter(|entry| {
            let title = entry.normalized_title();
            // Blank titles and links carry no identity and never match.
            let title_new = title.is_empty() || seen_titles.insert(title);
            let link_new = entry.link.is_empty() || seen_links.insert(entry.link.clone());
            title_new && link_new
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Result;
    use crate::domain::FeedSource;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    /// Serves canned bodies by URL; unknown URLs behave like an HTTP 500.
    struct MockFetcher {
        bodies: HashMap<String, String>,
    }

    impl MockFetcher {
        fn new(bodies: &[(&str, String)]) -> Self {
            Self {
                bodies: bodies
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.bodies
                .get(url)
                .map(|b| b.as_bytes().to_vec())
                .ok_or_else(|| {
                    LampstandError::Transport(format!("{} returned 500 Internal Server Error", url))
                })
        }
    }

    fn rss(items: &[(&str, &str, Option<&str>)]) -> String {
        let items: String = items
            .iter()
            .map(|(title, link, date)| {
                let date = date
                    .map(|d| format!("<pubDate>{}</pubDate>", d))
                    .unwrap_or_default();
                format!(
                    "<item><title>{}</title><link>{}</link>{}<description>d</description></item>",
                    title, link, date
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Feed</title>{}</channel></rss>"#,
            items
        )
    }

    fn aggregator(fetcher: MockFetcher, feeds: &[&str]) -> FeedAggregator {
        let mut catalog = FeedCatalog::builtin();
        catalog.set_feeds(
            Category::Science,
            feeds.iter().map(|url| FeedSource::new(*url)).collect(),
        );
        FeedAggregator::with_fetcher(Arc::new(fetcher), catalog, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_overlapping_sources_yield_one_entry() {
        let fetcher = MockFetcher::new(&[
            (
                "https://a.example/rss",
                rss(&[("Rocket Launch", "https://news.example/rocket", None)]),
            ),
            (
                "https://b.example/rss",
                rss(&[("ROCKET LAUNCH today", "https://news.example/rocket", None)]),
            ),
        ]);
        let agg = aggregator(fetcher, &["https://a.example/rss", "https://b.example/rss"]);

        let entries = agg.aggregate("science").await;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Rocket Launch");
    }

    #[tokio::test]
    async fn test_dedupe_by_title_case_insensitive() {
        let fetcher = MockFetcher::new(&[(
            "https://a.example/rss",
            rss(&[
                ("Same Story", "https://a.example/1", None),
                ("  same story ", "https://b.example/2", None),
            ]),
        )]);
        let agg = aggregator(fetcher, &["https://a.example/rss"]);

        let entries = agg.aggregate("science").await;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://a.example/1");
    }

    #[tokio::test]
    async fn test_failing_source_does_not_abort_others() {
        let fetcher = MockFetcher::new(&[(
            "https://ok.example/rss",
            rss(&[
                ("Middle", "https://ok.example/2", Some("Tue, 02 Jan 2024 00:00:00 GMT")),
                ("Oldest", "https://ok.example/1", Some("Mon, 01 Jan 2024 00:00:00 GMT")),
                ("Newest", "https://ok.example/3", Some("Wed, 03 Jan 2024 00:00:00 GMT")),
            ]),
        )]);
        let agg = aggregator(fetcher, &["https://broken.example/rss", "https://ok.example/rss"]);

        let aggregation = agg.aggregate_category(Category::Science).await;

        let titles: Vec<_> = aggregation.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
        assert_eq!(aggregation.failures.len(), 1);
        assert_eq!(aggregation.failures[0].0, "https://broken.example/rss");
        assert!(matches!(
            aggregation.partial_failure(),
            Some(LampstandError::PartialFailure { failed: 1, total: 2 })
        ));
    }

    #[tokio::test]
    async fn test_unknown_category_is_empty() {
        let agg = aggregator(MockFetcher::new(&[]), &[]);
        assert!(agg.aggregate("sports").await.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_image_assigned() {
        let fetcher = MockFetcher::new(&[(
            "https://a.example/rss",
            rss(&[("No Picture", "https://a.example/1", None)]),
        )]);
        let agg = aggregator(fetcher, &["https://a.example/rss"]);

        let entries = agg.aggregate("science").await;

        assert_eq!(
            entries[0].image_url.as_deref(),
            Some(catalog::builtin_fallback_image(Category::Science))
        );
    }

    fn entry_at(title: &str, day: Option<u32>) -> FeedEntry {
        let mut entry = FeedEntry::new(title, format!("https://x.example/{}", title));
        entry.published_at = day.map(|d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap());
        entry
    }

    #[test]
    fn test_finalize_sorts_and_truncates() {
        let mut entries: Vec<_> = (1..=12).map(|d| entry_at(&format!("e{}", d), Some(d))).collect();
        entries.insert(0, entry_at("undated", None));

        let result = finalize(entries, "https://img.example/fallback.png");

        assert_eq!(result.len(), PAGE_SIZE);
        assert_eq!(result[0].title, "e12");
        assert_eq!(result[9].title, "e3");
        assert!(result.iter().all(|e| e.title != "undated"));
    }

    #[test]
    fn test_undated_entries_sort_last() {
        let entries = vec![entry_at("undated", None), entry_at("dated", Some(5))];

        let result = finalize(entries, "f");

        assert_eq!(result[0].title, "dated");
        assert_eq!(result[1].title, "undated");
    }

    #[test]
    fn test_existing_image_kept() {
        let mut entry = entry_at("pic", Some(1));
        entry.image_url = Some("https://img.example/own.jpg".to_string());

        let result = finalize(vec![entry], "https://img.example/fallback.png");

        assert_eq!(result[0].image_url.as_deref(), Some("https://img.example/own.jpg"));
    }

    fn entry(title: &str, link: &str) -> FeedEntry {
        FeedEntry::new(title, link)
    }

    #[test]
    fn test_dedupe_matches_against_dropped_entries() {
        let entries = vec![
            entry("First", "https://x/1"),
            entry("Second", "https://x/1"),
            entry("second", "https://x/3"),
        ];

        let links: Vec<_> = dedupe(entries).into_iter().map(|e| e.link).collect();

        assert_eq!(links, vec!["https://x/1"]);
    }

    #[test]
    fn test_dedupe_ignores_blank_titles() {
        let entries = vec![
            entry("", "https://x/1"),
            entry("  ", "https://x/2"),
            entry("Story", "https://x/3"),
            entry(" story ", "https://x/4"),
        ];

        let links: Vec<_> = dedupe(entries).into_iter().map(|e| e.link).collect();

        assert_eq!(links, vec!["https://x/1", "https://x/2", "https://x/3"]);
    }
}
