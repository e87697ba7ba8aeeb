//! Full-article extraction and the enrichment pipeline.
//!
//! # Architecture
//!
//! ```text
//! FeedEntry (with link) → Enricher → ArticleCache hit?
//!                                  └─ miss → Extractor → cache write → EnrichedEntry
//! ```
//!
//! Two extractors are provided: [`HttpExtractor`] parses the fetched HTML
//! directly and [`ChromeExtractor`] renders the page in headless Chrome.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lampstand::scraper::{Enricher, HttpExtractor, ExtractorConfig};
//!
//! let extractor = HttpExtractor::new(&ExtractorConfig::default())?;
//! let enricher = Enricher::new(store, Arc::new(extractor), Duration::from_secs(30));
//! let enriched = enricher.enrich_all(entries, Category::Science).await;
//! ```

mod chrome;
mod config;
mod enrich;
mod extractor;
mod http;

pub use chrome::ChromeExtractor;
pub use config::{ChromeOptions, ExtractorBackend, ExtractorConfig};
pub use enrich::Enricher;
pub use extractor::PageScript;
pub use http::HttpExtractor;

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app::Result;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Successful extraction of one article page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Cleaned article HTML
    pub content: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub published: Option<String>,
}

impl Extraction {
    /// Readable length of the content, ignoring markup.
    pub fn text_len(&self) -> usize {
        html_to_text(&self.content).chars().count()
    }
}

/// External extraction collaborator.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract the article at `url`. Empty content is an error.
    async fn extract(&self, url: &str) -> Result<Extraction>;
}

/// Build the extractor selected by `config.backend`.
pub async fn build_extractor(config: &ExtractorConfig) -> Result<Arc<dyn Extractor>> {
    match config.backend {
        ExtractorBackend::Http => Ok(Arc::new(HttpExtractor::new(config)?)),
        ExtractorBackend::Chrome => Ok(Arc::new(ChromeExtractor::new(config).await?)),
    }
}

/// Drop `<script>` and `<style>` blocks and collapse whitespace.
pub fn clean_html(html: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(html, "");
    let without_styles = STYLE_RE.replace_all(&without_scripts, "");
    WHITESPACE_RE
        .replace_all(&without_styles, " ")
        .trim()
        .to_string()
}

/// Plain text of an HTML fragment with whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, " ");
    let decoded = html_escape::decode_html_entities(&stripped);
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}
