use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::app::{LampstandError, Result};
use crate::domain::{FeedEntry, FeedSource};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

pub const DEFAULT_WORKERS: usize = 10;

pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, timeout: Duration) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS, timeout)
    }

    pub fn with_workers(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        workers: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            timeout,
        }
    }

    /// Fetch and normalize every source concurrently.
    ///
    /// Results come back in the order of `sources`, whatever order the
    /// requests finish in. One source failing never cancels the others.
    pub async fn fetch_all(
        &self,
        sources: Vec<FeedSource>,
        normalizer: &Normalizer,
    ) -> Vec<(FeedSource, Result<Vec<FeedEntry>>)> {
        let mut handles = Vec::new();

        for source in sources {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();
            let normalizer = normalizer.clone();
            let timeout = self.timeout;

            let task_source = source.clone();
            let handle = tokio::spawn(async move {
                match semaphore.acquire().await {
                    Ok(_permit) => {
                        fetch_single_source(&fetcher, &task_source, &normalizer, timeout).await
                    }
                    Err(e) => Err(LampstandError::Other(format!("Semaphore closed: {}", e))),
                }
            });

            handles.push((source, handle));
        }

        let mut results = Vec::new();
        for (source, handle) in handles {
            let result = handle.await.unwrap_or_else(|e| {
                tracing::error!("Task join error for {}: {}", source.url, e);
                Err(LampstandError::Other(format!("fetch task failed: {}", e)))
            });
            results.push((source, result));
        }

        results
    }
}

async fn fetch_single_source(
    fetcher: &Arc<dyn Fetcher + Send + Sync>,
    source: &FeedSource,
    normalizer: &Normalizer,
    timeout: Duration,
) -> Result<Vec<FeedEntry>> {
    let body = tokio::time::timeout(timeout, fetcher.fetch(&source.url))
        .await
        .map_err(|_| LampstandError::Transport(format!("{} timed out", source.url)))??;

    let entries = normalizer.normalize(source, &body)?;
    tracing::debug!("Parsed {} entries from {}", entries.len(), source.url);

    Ok(entries)
}
