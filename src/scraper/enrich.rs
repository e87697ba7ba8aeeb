use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::app::{LampstandError, Result};
use crate::domain::{ArticleRecord, Category, EnrichedEntry, FeedEntry};
use crate::scraper::{Extraction, Extractor};
use crate::store::ArticleCache;

/// Write-through, negative-caching enrichment of feed entries.
///
/// Every URL reaches the live extractor at most once: successes and
/// failures are both persisted, and a cached failure is never retried.
pub struct Enricher {
    cache: Arc<dyn ArticleCache + Send + Sync>,
    extractor: Arc<dyn Extractor>,
    timeout: Duration,
}

impl Enricher {
    pub fn new(
        cache: Arc<dyn ArticleCache + Send + Sync>,
        extractor: Arc<dyn Extractor>,
        timeout: Duration,
    ) -> Self {
        Self {
            cache,
            extractor,
            timeout,
        }
    }

    /// Enrich every entry concurrently. Output order matches input order.
    pub async fn enrich_all(&self, entries: Vec<FeedEntry>, category: Category) -> Vec<EnrichedEntry> {
        join_all(entries.into_iter().map(|entry| self.enrich(entry, category))).await
    }

    pub async fn enrich(&self, entry: FeedEntry, category: Category) -> EnrichedEntry {
        let mut enriched = EnrichedEntry::new(entry);
        let url = enriched.entry.link.clone();

        let cached = match self.cache.get_article_by_url(&url) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("Cache lookup failed for {}: {}", url, e);
                None
            }
        };

        match cached {
            Some(record) if record.has_full_content() => {
                tracing::debug!("Cache hit for {}", enriched.entry.short_key());
                enriched.full_content = record.full_content;
                enriched.extraction_failed = record.extraction_failed;
                match record.image_url.filter(|i| !i.is_empty()) {
                    Some(image) => enriched.entry.image_url = Some(image),
                    None => self.refresh_image(&mut enriched).await,
                }
            }
            Some(record) if record.extraction_failed => {
                tracing::debug!("Skipping {}: extraction failed before", url);
                enriched.extraction_failed = true;
                if let Some(image) = record.image_url.filter(|i| !i.is_empty()) {
                    enriched.entry.image_url = Some(image);
                }
            }
            _ => {
                match self.extract(&url).await {
                    Ok(extraction) => {
                        enriched.full_content = Some(extraction.content);
                        if let Some(image) = extraction.image.filter(|i| !i.is_empty()) {
                            enriched.entry.image_url = Some(image);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Extraction failed for {}: {}", url, e);
                        enriched.extraction_failed = true;
                    }
                }

                let record = ArticleRecord::from_enriched(&enriched, category);
                if let Err(e) = self.cache.upsert_article(&record) {
                    tracing::warn!("Failed to cache {}: {}", url, e);
                }
            }
        }

        enriched
    }

    /// Cached content without an image: one live call for the image only.
    async fn refresh_image(&self, enriched: &mut EnrichedEntry) {
        let url = enriched.entry.link.clone();
        match self.extract(&url).await {
            Ok(extraction) => {
                if let Some(image) = extraction.image.filter(|i| !i.is_empty()) {
                    if let Err(e) = self.cache.update_image(&url, &image) {
                        tracing::warn!("Failed to cache image for {}: {}", url, e);
                    }
                    enriched.entry.image_url = Some(image);
                }
            }
            Err(e) => tracing::debug!("Image refresh failed for {}: {}", url, e),
        }
    }

    async fn extract(&self, url: &str) -> Result<Extraction> {
        tokio::time::timeout(self.timeout, self.extractor.extract(url))
            .await
            .map_err(|_| LampstandError::Transport(format!("extraction of {} timed out", url)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls; succeeds unless the URL contains "fail".
    struct CountingExtractor {
        calls: AtomicUsize,
        image: Option<String>,
        delay: Duration,
    }

    impl CountingExtractor {
        fn new(image: Option<&str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                image: image.map(String::from),
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Extractor for CountingExtractor {
        async fn extract(&self, url: &str) -> Result<Extraction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if url.contains("fail") {
                return Err(LampstandError::Paywalled(format!("{} returned 403", url)));
            }
            Ok(Extraction {
                content: format!("<p>Full text of {}</p>", url),
                image: self.image.clone(),
                ..Default::default()
            })
        }
    }

    fn setup(extractor: CountingExtractor) -> (Arc<SqliteStore>, Arc<CountingExtractor>, Enricher) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let extractor = Arc::new(extractor);
        let enricher = Enricher::new(store.clone(), extractor.clone(), Duration::from_secs(5));
        (store, extractor, enricher)
    }

    #[tokio::test]
    async fn test_cache_miss_extracts_and_persists() {
        let (store, extractor, enricher) = setup(CountingExtractor::new(Some("https://img.example/x.jpg")));
        let entry = FeedEntry::new("Story", "https://news.example/story");

        let enriched = enricher.enrich(entry, Category::Science).await;

        assert_eq!(extractor.calls(), 1);
        assert!(!enriched.extraction_failed);
        assert_eq!(
            enriched.full_content.as_deref(),
            Some("<p>Full text of https://news.example/story</p>")
        );
        assert_eq!(enriched.entry.image_url.as_deref(), Some("https://img.example/x.jpg"));

        let record = store.get_article_by_url("https://news.example/story").unwrap().unwrap();
        assert!(record.has_full_content());
        assert_eq!(record.category, "science");
    }

    #[tokio::test]
    async fn test_failed_extraction_is_not_retried() {
        let (store, extractor, enricher) = setup(CountingExtractor::new(None));
        let entry = FeedEntry::new("Locked", "https://news.example/fail");

        let first = enricher.enrich(entry.clone(), Category::Usa).await;
        let second = enricher.enrich(entry, Category::Usa).await;

        assert!(first.extraction_failed);
        assert!(second.extraction_failed);
        assert!(second.full_content.is_none());
        assert_eq!(extractor.calls(), 1);

        let record = store.get_article_by_url("https://news.example/fail").unwrap().unwrap();
        assert!(record.extraction_failed);
    }

    #[tokio::test]
    async fn test_cached_content_used_verbatim() {
        let (store, extractor, enricher) = setup(CountingExtractor::new(None));
        let mut record = ArticleRecord::new("https://news.example/cached", "usa", "Cached");
        record.full_content = Some("stored text".into());
        record.image_url = Some("https://img.example/stored.png".into());
        store.upsert_article(&record).unwrap();

        let enriched = enricher
            .enrich(FeedEntry::new("Cached", "https://news.example/cached"), Category::Usa)
            .await;

        assert_eq!(extractor.calls(), 0);
        assert_eq!(enriched.full_content.as_deref(), Some("stored text"));
        assert_eq!(
            enriched.entry.image_url.as_deref(),
            Some("https://img.example/stored.png")
        );
    }

    #[tokio::test]
    async fn test_missing_cached_image_refreshed_once() {
        let (store, extractor, enricher) = setup(CountingExtractor::new(Some("https://img.example/new.jpg")));
        let mut record = ArticleRecord::new("https://news.example/noimg", "usa", "No image");
        record.full_content = Some("stored text".into());
        store.upsert_article(&record).unwrap();

        let first = enricher
            .enrich(FeedEntry::new("No image", "https://news.example/noimg"), Category::Usa)
            .await;
        let second = enricher
            .enrich(FeedEntry::new("No image", "https://news.example/noimg"), Category::Usa)
            .await;

        assert_eq!(first.full_content.as_deref(), Some("stored text"));
        assert_eq!(first.entry.image_url.as_deref(), Some("https://img.example/new.jpg"));
        assert_eq!(second.entry.image_url.as_deref(), Some("https://img.example/new.jpg"));
        // second call is served from the refreshed cache
        assert_eq!(extractor.calls(), 1);

        let stored = store.get_article_by_url("https://news.example/noimg").unwrap().unwrap();
        assert_eq!(stored.full_content.as_deref(), Some("stored text"));
    }

    #[tokio::test]
    async fn test_timeout_marks_failure() {
        let mut slow = CountingExtractor::new(None);
        slow.delay = Duration::from_millis(200);
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let enricher = Enricher::new(store.clone(), Arc::new(slow), Duration::from_millis(20));

        let enriched = enricher
            .enrich(FeedEntry::new("Slow", "https://news.example/slow"), Category::Science)
            .await;

        assert!(enriched.extraction_failed);
        let record = store.get_article_by_url("https://news.example/slow").unwrap().unwrap();
        assert!(record.extraction_failed);
    }

    #[tokio::test]
    async fn test_enrich_all_keeps_order() {
        let (_store, extractor, enricher) = setup(CountingExtractor::new(None));
        let entries = vec![
            FeedEntry::new("A", "https://news.example/a"),
            FeedEntry::new("B", "https://news.example/fail-b"),
            FeedEntry::new("C", "https://news.example/c"),
        ];

        let enriched = enricher.enrich_all(entries, Category::Science).await;

        let titles: Vec<_> = enriched.iter().map(|e| e.entry.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert!(enriched[1].extraction_failed);
        assert!(!enriched[2].extraction_failed);
        assert_eq!(extractor.calls(), 3);
    }
}
