use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::{LampstandError, Result};
use crate::fetcher::Fetcher;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LampstandError::Transport(format!("{} timed out", url))
            } else {
                LampstandError::Http(e)
            }
        })?;

        if !response.status().is_success() {
            return Err(LampstandError::Transport(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let body = response.bytes().await?.to_vec();
        Ok(body)
    }
}
