use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static FOOTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"The post .+ appeared first on .+\.$").unwrap());

/// One normalized record from an external feed. `link` is its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub title: String,
    pub description: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    pub content: String,
    pub image_url: Option<String>,
}

impl FeedEntry {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            link: link.into(),
            published_at: None,
            source: String::new(),
            content: String::new(),
            image_url: None,
        }
    }

    /// Deterministic hex SHA-256 of the link.
    pub fn key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.link.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Short form of [`key`](Self::key) for log lines.
    pub fn short_key(&self) -> String {
        self.key()[..8].to_string()
    }

    /// Lower-cased, trimmed title used for duplicate detection.
    pub fn normalized_title(&self) -> String {
        self.title.trim().to_lowercase()
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }

    /// Description as plain text, without a repeated title or a syndication footer.
    pub fn plain_summary(&self) -> String {
        let decoded = decode_html_entities(&self.description).to_string();
        let stripped = TAG_RE.replace_all(&decoded, "");
        let mut summary = stripped.trim().to_string();

        if let Some(rest) = strip_prefix_ignore_case(&summary, self.title.trim()) {
            summary = rest.trim().to_string();
        }

        FOOTER_RE.replace(&summary, "").trim().to_string()
    }
}

/// `text` after `prefix`, comparing char by char case-insensitively so the
/// offset stays valid when case mapping changes byte lengths.
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let mut chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.as_str())
}

/// A feed entry after the enrichment pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedEntry {
    #[serde(flatten)]
    pub entry: FeedEntry,
    pub full_content: Option<String>,
    pub extraction_failed: bool,
}

impl EnrichedEntry {
    pub fn new(entry: FeedEntry) -> Self {
        Self {
            entry,
            full_content: None,
            extraction_failed: false,
        }
    }

    /// Get the best available text for display or analysis
    pub fn best_text(&self) -> &str {
        self.full_content
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(Some(self.entry.content.as_str()).filter(|c| !c.is_empty()))
            .or(Some(self.entry.description.as_str()).filter(|c| !c.is_empty()))
            .unwrap_or(&self.entry.title)
    }
}
