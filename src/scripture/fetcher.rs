use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::app::{LampstandError, Result};
use crate::domain::{Address, Verse};

/// Upper bound on probing; the longest chapter has 176 verses.
pub const MAX_VERSES: u16 = 200;

/// A text source that answers one verse at a time.
#[async_trait]
pub trait VerseSource: Send + Sync {
    /// `Ok(None)` means the verse does not exist. `Err` is a transport fault.
    async fn verse(&self, book: u8, chapter: u16, verse: u16) -> Result<Option<String>>;
}

/// Anything that can produce the full text of a chapter.
///
/// Implementations never fail: a transport fault truncates the chapter at the
/// point it happened and an unknown chapter yields an empty list.
#[async_trait]
pub trait ChapterSource: Send + Sync {
    async fn chapter(&self, address: Address) -> Vec<Verse>;
}

/// Fetches a chapter by requesting verse 1, 2, 3... until the first gap.
pub struct VerseProber {
    source: Arc<dyn VerseSource>,
    timeout: Duration,
}

impl VerseProber {
    pub fn new(source: Arc<dyn VerseSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    async fn probe(&self, address: Address, number: u16) -> Result<Option<String>> {
        tokio::time::timeout(
            self.timeout,
            self.source.verse(address.book, address.chapter, number),
        )
        .await
        .map_err(|_| LampstandError::Transport(format!("timed out after {:?}", self.timeout)))?
    }
}

#[async_trait]
impl ChapterSource for VerseProber {
    async fn chapter(&self, address: Address) -> Vec<Verse> {
        let mut verses = Vec::new();

        for number in 1..=MAX_VERSES {
            match self.probe(address, number).await {
                Ok(Some(text)) => verses.push(Verse::new(number, text.trim())),
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        "Verse {}:{}:{} failed, truncating chapter: {}",
                        address.book, address.chapter, number, e
                    );
                    break;
                }
            }
        }

        debug!("Fetched {} verses for {}", verses.len(), address.label());
        verses
    }
}

/// Keep only the run of verses numbered 1, 2, 3... without gaps.
pub fn contiguous_prefix(mut verses: Vec<Verse>) -> Vec<Verse> {
    verses.sort_by_key(|v| v.number);
    verses.dedup_by_key(|v| v.number);

    let run = verses
        .iter()
        .zip(1u16..)
        .take_while(|(v, expected)| v.number == *expected)
        .count();
    verses.truncate(run);
    verses
}
