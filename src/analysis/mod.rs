//! Thematic cross-referencing of articles against scripture.
//!
//! ```text
//! article text → prompt → Generator (token stream) → collect → payload
//!                                                      ↓          ↓
//!                                             ArticleCache   PassageResolver
//! ```

pub mod generator;
pub mod payload;

pub use generator::{collect, Generator, OllamaGenerator};
pub use payload::{parse_payload, AnalysisPayload, PassageLink, Theme};

use std::sync::Arc;

use serde::Serialize;

use crate::app::{LampstandError, Result};
use crate::domain::{ArticleRecord, Category, ResolvedPassage};
use crate::scripture::PassageResolver;
use crate::store::ArticleCache;

/// Stored article content is cut to this many characters.
pub const MAX_STORED_CONTENT: usize = 5000;

/// An article to analyze.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub url: String,
    pub title: String,
    pub text: String,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// True when the response came from the store instead of the model.
    pub cached: bool,
    pub response: String,
    pub payload: Option<AnalysisPayload>,
    /// Each cited reference with its text, or `None` when it did not resolve.
    pub passages: Vec<(String, Option<ResolvedPassage>)>,
}

pub struct Analyzer {
    cache: Arc<dyn ArticleCache + Send + Sync>,
    generator: Arc<dyn Generator>,
    resolver: PassageResolver,
}

impl Analyzer {
    pub fn new(
        cache: Arc<dyn ArticleCache + Send + Sync>,
        generator: Arc<dyn Generator>,
        resolver: PassageResolver,
    ) -> Self {
        Self {
            cache,
            generator,
            resolver,
        }
    }

    /// Analyze an article, reusing the stored analysis when one exists.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport> {
        if request.text.trim().is_empty() {
            return Err(LampstandError::Other("article text is required".to_string()));
        }

        let existing = self.cache.get_article_by_url(&request.url)?;

        if let Some(article) = &existing {
            if let Some(analysis) = self.cache.latest_analysis(article.id)? {
                tracing::info!("Using stored analysis for {}", request.url);
                return Ok(self.report(true, analysis.response).await);
            }
        }

        let prompt = build_prompt(&request.text);
        let tokens = self.generator.generate(&prompt).await?;
        let response = collect(tokens).await?;

        let article_id = match existing {
            Some(article) => article.id,
            None => {
                let category = request
                    .category
                    .map(|c| c.slug().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let mut record = ArticleRecord::new(&request.url, category, &request.title);
                record.content = Some(request.text.chars().take(MAX_STORED_CONTENT).collect());
                self.cache.upsert_article(&record)?
            }
        };
        self.cache.save_analysis(article_id, &response)?;

        Ok(self.report(false, response).await)
    }

    async fn report(&self, cached: bool, response: String) -> AnalysisReport {
        let payload = match parse_payload(&response) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!("Could not parse analysis payload: {}", e);
                None
            }
        };

        let passages = match &payload {
            Some(payload) => self.resolver.resolve_all(&payload.references()).await,
            None => Vec::new(),
        };

        AnalysisReport {
            cached,
            response,
            payload,
            passages,
        }
    }
}

/// Prompt asking for themes and passages as JSON.
pub fn build_prompt(article_text: &str) -> String {
    format!(
        r#"You are a neutral analyst connecting current events to biblical themes. Your task is to analyze news articles and identify possible biblical parallels, themes, and relevant scripture passages without promoting any agenda.

For the following news article, provide an exploratory analysis:

1. Identify 3-5 main themes present in the article (e.g., justice, suffering, leadership, conflict, hope, redemption, judgment, mercy, etc.)
2. For each theme, suggest 2-3 relevant Bible passages that connect to it
3. Explain the connection between each passage and the news story
4. If you identify a PROPHETIC PARALLEL (a connection to biblical prophecy or eschatological themes), explicitly label it with "PROPHETIC PARALLEL:" before explaining it

Return your response as valid JSON in this exact format:
{{
  "themes": [
    {{
      "name": "Theme Name",
      "passages": [
        {{
          "reference": "Book Chapter:Verse-Verse",
          "connection": "Explanation of how this passage relates to the news",
          "isProphetic": false
        }}
      ]
    }}
  ]
}}

NEWS ARTICLE:
{article_text}

Remember: Be neutral and exploratory. Focus on thematic connections and let the user draw their own conclusions."#
    )
}
