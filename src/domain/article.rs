use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, EnrichedEntry};

/// Cached article row, keyed by its unique URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: i64,
    pub url: String,
    pub category: String,
    pub title: String,
    pub content: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source_name: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub full_content: Option<String>,
    pub extraction_failed: bool,
    pub image_url: Option<String>,
}

impl ArticleRecord {
    pub fn new(url: impl Into<String>, category: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: category.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Build the row persisted after an enrichment attempt.
    pub fn from_enriched(enriched: &EnrichedEntry, category: Category) -> Self {
        let entry = &enriched.entry;
        Self {
            id: 0,
            url: entry.link.clone(),
            category: category.slug().to_string(),
            title: entry.title.clone(),
            content: Some(entry.content.clone()).filter(|c| !c.is_empty()),
            description: Some(entry.description.clone()).filter(|d| !d.is_empty()),
            published_at: entry.published_at,
            source_name: Some(entry.source.clone()).filter(|s| !s.is_empty()),
            fetched_at: Some(Utc::now()),
            full_content: enriched.full_content.clone(),
            extraction_failed: enriched.extraction_failed,
            image_url: enriched.entry.image_url.clone(),
        }
    }

    pub fn has_full_content(&self) -> bool {
        self.full_content.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// One stored model response for an article. Analyses are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: i64,
    pub article_id: i64,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub article: ArticleRecord,
    pub user_note: Option<String>,
    pub created_at: DateTime<Utc>,
}
