//! Client for the bolls.life text API.
//!
//! - `GET {base}/get-verse/{translation}/{book}/{chapter}/{verse}/`
//! - `GET {base}/get-chapter/{translation}/{book}/{chapter}/`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::app::{LampstandError, Result};
use crate::domain::{Address, Verse};
use crate::scripture::fetcher::{contiguous_prefix, ChapterSource, VerseSource};

#[derive(Debug, Deserialize)]
struct VerseBody {
    #[serde(default)]
    verse: Option<u16>,
    #[serde(default)]
    text: Option<String>,
}

pub struct BollsClient {
    client: Client,
    base_url: String,
    translation: String,
}

impl BollsClient {
    pub fn new(base_url: &str, translation: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("lampstand/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            translation: translation.to_string(),
        })
    }

    fn verse_url(&self, book: u8, chapter: u16, verse: u16) -> String {
        format!(
            "{}/get-verse/{}/{}/{}/{}/",
            self.base_url, self.translation, book, chapter, verse
        )
    }

    fn chapter_url(&self, address: Address) -> String {
        format!(
            "{}/get-chapter/{}/{}/{}/",
            self.base_url, self.translation, address.book, address.chapter
        )
    }

    async fn fetch_chapter(&self, address: Address) -> Result<Vec<Verse>> {
        let response = self.client.get(self.chapter_url(address)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(LampstandError::Transport(format!(
                "chapter request returned {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        let rows: Vec<VerseBody> = serde_json::from_slice(&body)?;

        let verses = rows
            .into_iter()
            .filter_map(|row| {
                let text = row.text?.trim().to_string();
                (!text.is_empty()).then_some(Verse::new(row.verse?, text))
            })
            .collect();

        Ok(contiguous_prefix(verses))
    }
}

#[async_trait]
impl VerseSource for BollsClient {
    async fn verse(&self, book: u8, chapter: u16, verse: u16) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.verse_url(book, chapter, verse))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(LampstandError::Transport(format!(
                "verse request returned {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        let parsed: VerseBody = match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            // The API answers some misses with an empty or non-object body
            Err(_) => return Ok(None),
        };

        Ok(parsed
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }
}

#[async_trait]
impl ChapterSource for BollsClient {
    async fn chapter(&self, address: Address) -> Vec<Verse> {
        match self.fetch_chapter(address).await {
            Ok(verses) => {
                debug!("Fetched {} verses for {}", verses.len(), address.label());
                verses
            }
            Err(e) => {
                warn!("Chapter fetch failed for {}: {}", address.label(), e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client =
            BollsClient::new("https://bolls.life/", "NET", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.verse_url(43, 3, 16),
            "https://bolls.life/get-verse/NET/43/3/16/"
        );
        assert_eq!(
            client.chapter_url(Address { book: 1, chapter: 2 }),
            "https://bolls.life/get-chapter/NET/1/2/"
        );
    }
}
