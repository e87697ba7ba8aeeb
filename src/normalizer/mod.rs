use std::sync::LazyLock;

use chrono::Utc;
use feed_rs::model::Entry;
use feed_rs::parser;
use html_escape::decode_html_entities;
use regex::Regex;

use crate::app::{LampstandError, Result};
use crate::domain::{FeedEntry, FeedSource};

/// Image patterns tried in order against entry HTML.
static IMAGE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["'][^>]*>"#).unwrap(),
        Regex::new(r#"(?i)<img[^>]+src=([^\s>]+)[^>]*>"#).unwrap(),
        Regex::new(r#"(?i)https?://[^\s<>"]+?\.(?:jpg|jpeg|png|gif|webp)"#).unwrap(),
    ]
});

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse an RSS, Atom or JSON Feed payload into entries.
    ///
    /// Entries without a link are dropped since the link is their identity.
    pub fn normalize(&self, source: &FeedSource, body: &[u8]) -> Result<Vec<FeedEntry>> {
        let feed = parser::parse(body).map_err(|e| LampstandError::FeedParse(e.to_string()))?;

        let label = source
            .name
            .clone()
            .or_else(|| {
                feed.title
                    .as_ref()
                    .map(|t| decode_html_entities(t.content.trim()).to_string())
                    .filter(|t| !t.is_empty())
            })
            .or_else(|| host_of(&source.url))
            .unwrap_or_else(|| source.url.clone());

        let entries = feed
            .entries
            .into_iter()
            .filter_map(|entry| normalize_entry(entry, &label))
            .collect();

        Ok(entries)
    }
}

fn normalize_entry(entry: Entry, label: &str) -> Option<FeedEntry> {
    let link = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .filter(|l| !l.is_empty())?;

    let media_image = media_image(&entry);

    let description = entry
        .summary
        .map(|s| decode_html_entities(&s.content).to_string())
        .unwrap_or_default();
    let content = entry
        .content
        .and_then(|c| c.body)
        .map(|b| decode_html_entities(&b).to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| description.clone());

    let image_url = media_image
        .or_else(|| extract_image(&content))
        .or_else(|| extract_image(&description));

    Some(FeedEntry {
        title: entry
            .title
            .map(|t| decode_html_entities(t.content.trim()).to_string())
            .unwrap_or_default(),
        description,
        link,
        published_at: entry.published.or(entry.updated).map(|dt| dt.with_timezone(&Utc)),
        source: label.to_string(),
        content,
        image_url,
    })
}

/// Enclosures and media:content first, then media:thumbnail.
fn media_image(entry: &Entry) -> Option<String> {
    let content = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| c.url.as_ref().map(|u| u.to_string()));

    content.or_else(|| {
        entry
            .media
            .iter()
            .flat_map(|m| m.thumbnails.iter())
            .map(|t| t.image.uri.clone())
            .find(|uri| !uri.is_empty())
    })
}

/// First image URL found in an HTML fragment.
pub fn extract_image(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }

    IMAGE_PATTERNS.iter().find_map(|re| {
        re.captures(html).map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
    })
    .filter(|url| !url.is_empty())
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
}
