use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which extraction collaborator to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorBackend {
    /// Plain HTTP fetch and HTML parsing
    #[default]
    Http,
    /// Headless Chrome via chromiumoxide
    Chrome,
}

/// The `[extractor]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub backend: ExtractorBackend,
    /// Per-article budget, in seconds.
    pub timeout_secs: u64,
    /// Extractions with less readable text than this are failures.
    pub min_content_length: usize,
    /// Overrides the default browser-like user agent.
    pub user_agent: Option<String>,
    pub chrome: ChromeOptions,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            backend: ExtractorBackend::Http,
            timeout_secs: 30,
            min_content_length: 200,
            user_agent: None,
            chrome: ChromeOptions::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[extractor.chrome]`: only read by the Chrome backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeOptions {
    pub headless: bool,
    /// Pause after navigation so scripted pages can render.
    pub settle_ms: u64,
    /// Browser pages open at once.
    pub pages: usize,
    /// Tried in order; the first with enough text wins.
    pub content_selectors: Vec<String>,
    /// Removed from the page before the content is read.
    pub strip_selectors: Vec<String>,
}

const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    "main",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".story-body",
    "#content",
    ".content",
];

const STRIP_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    "form",
    ".newsletter",
    ".paywall",
    ".advertisement",
    ".ad",
    ".social-share",
    ".comments",
    ".related",
    "script",
    "style",
    "noscript",
];

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: true,
            settle_ms: 1000,
            pages: 5,
            content_selectors: CONTENT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            strip_selectors: STRIP_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ChromeOptions {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
