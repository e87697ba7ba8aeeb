use std::sync::Arc;

use tracing::debug;

use crate::app::{LampstandError, Result};
use crate::domain::{Address, ChapterView, ResolvedPassage};
use crate::scripture::fetcher::ChapterSource;
use crate::scripture::navigator::{self, Direction};
use crate::scripture::parser;

/// Answers citations with the requested verses and their whole chapter.
#[derive(Clone)]
pub struct PassageResolver {
    source: Arc<dyn ChapterSource>,
}

impl PassageResolver {
    pub fn new(source: Arc<dyn ChapterSource>) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, reference: &str) -> Result<ResolvedPassage> {
        let citation = parser::parse(reference)?;
        let full_chapter = self.source.chapter(citation.address()).await;

        if full_chapter.is_empty() {
            return Err(LampstandError::NotFound(format!(
                "no text for {}",
                citation.address().label()
            )));
        }

        let range = citation.verse_range();
        let selected: Vec<_> = full_chapter
            .iter()
            .filter(|v| range.contains(&v.number))
            .collect();

        if selected.is_empty() {
            return Err(LampstandError::NotFound(format!(
                "{} has no verses in {}-{}",
                citation.address().label(),
                range.start(),
                range.end()
            )));
        }

        let requested_verses = selected.iter().map(|v| v.number).collect();
        let text = selected
            .iter()
            .map(|v| v.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        debug!("Resolved '{}' to {} verses", reference, selected.len());

        Ok(ResolvedPassage {
            reference: reference.to_string(),
            text,
            full_chapter,
            requested_verses,
            book_number: citation.book,
            chapter_number: citation.chapter,
        })
    }

    /// Fetch the chapter one step from `address` in `direction`.
    pub async fn navigate(&self, address: Address, direction: Direction) -> Result<ChapterView> {
        let target = navigator::step(address, direction);
        let full_chapter = self.source.chapter(target).await;

        if full_chapter.is_empty() {
            return Err(LampstandError::NotFound(format!(
                "no text for {}",
                target.label()
            )));
        }

        Ok(ChapterView {
            full_chapter,
            book_number: target.book,
            chapter_number: target.chapter,
        })
    }

    /// Resolve many citations concurrently, keeping input order.
    pub async fn resolve_all(&self, references: &[String]) -> Vec<(String, Option<ResolvedPassage>)> {
        let lookups = references.iter().map(|r| async move {
            let passage = match self.resolve(r).await {
                Ok(p) => Some(p),
                Err(e) => {
                    debug!("Could not resolve '{}': {}", r, e);
                    None
                }
            };
            (r.clone(), passage)
        });
        futures::future::join_all(lookups).await
    }
}
