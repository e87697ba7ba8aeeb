use std::sync::Arc;

use crate::aggregator::{FeedAggregator, FeedCatalog};
use crate::analysis::{Analyzer, OllamaGenerator};
use crate::app::error::{LampstandError, Result};
use crate::config::{Config, ScriptureMode};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::Fetcher;
use crate::scraper::{self, Enricher, Extractor};
use crate::scripture::{BollsClient, ChapterSource, PassageResolver, VerseProber};
use crate::store::sqlite::SqliteStore;

/// Wires the configured collaborators together.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub aggregator: FeedAggregator,
    pub resolver: PassageResolver,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config
            .database_path()
            .map_err(|e| LampstandError::Config(e.to_string()))?;
        let store = Arc::new(SqliteStore::new(&db_path)?);
        Self::build(config, store)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::build(config, store)
    }

    fn build(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(
            config.http.timeout(),
            &config.http.user_agent,
        )?);
        let parallel_fetcher =
            ParallelFetcher::with_workers(fetcher, config.http.workers, config.http.timeout());
        let catalog = FeedCatalog::builtin().with_overrides(&config.categories);
        let aggregator = FeedAggregator::new(parallel_fetcher, catalog);

        let resolver = PassageResolver::new(Self::chapter_source(&config)?);

        Ok(Self {
            config,
            store,
            aggregator,
            resolver,
        })
    }

    fn chapter_source(config: &Config) -> Result<Arc<dyn ChapterSource>> {
        let scripture = &config.scripture;
        let client = Arc::new(BollsClient::new(
            &scripture.base_url,
            &scripture.translation,
            scripture.timeout(),
        )?);

        let source: Arc<dyn ChapterSource> = match scripture.mode {
            ScriptureMode::Chapter => client,
            ScriptureMode::Probe => Arc::new(VerseProber::new(client, scripture.timeout())),
        };
        Ok(source)
    }

    /// The configured extractor. Chrome is only launched when this is called.
    pub async fn extractor(&self) -> Result<Arc<dyn Extractor>> {
        scraper::build_extractor(&self.config.extractor).await
    }

    pub async fn enricher(&self) -> Result<Enricher> {
        Ok(Enricher::new(
            self.store.clone(),
            self.extractor().await?,
            self.config.extractor.timeout(),
        ))
    }

    pub fn analyzer(&self) -> Result<Analyzer> {
        let analysis = &self.config.analysis;
        let generator = OllamaGenerator::new(&analysis.endpoint, &analysis.model, analysis.timeout())?;

        Ok(Analyzer::new(
            self.store.clone(),
            Arc::new(generator),
            self.resolver.clone(),
        ))
    }
}
