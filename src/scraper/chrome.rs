use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::app::{LampstandError, Result};
use crate::scraper::config::ExtractorConfig;
use crate::scraper::extractor::PageScript;
use crate::scraper::{clean_html, Extraction, Extractor};

/// What [`PageScript`] evaluates to.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageReport {
    html: String,
    text: String,
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    published: Option<String>,
}

/// Renders article pages in a shared headless browser.
pub struct ChromeExtractor {
    browser: Arc<Browser>,
    pages: Arc<Semaphore>,
    script: String,
    user_agent: Option<String>,
    settle: Duration,
    min_content_length: usize,
}

impl ChromeExtractor {
    pub async fn new(config: &ExtractorConfig) -> Result<Self> {
        let options = &config.chrome;

        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if !options.headless {
            builder = builder.with_head();
        }
        let browser_config = builder
            .build()
            .map_err(|e| LampstandError::Extraction(format!("browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            LampstandError::Extraction(format!(
                "could not launch Chrome ({}); set extractor.backend = \"http\" to run without it",
                e
            ))
        })?;

        // The CDP connection only makes progress while its handler is polled
        tokio::spawn(async move { while handler.next().await.is_some() {} });

        tracing::info!("Chrome extractor ready ({} pages)", options.pages.max(1));

        Ok(Self {
            browser: Arc::new(browser),
            pages: Arc::new(Semaphore::new(options.pages.max(1))),
            script: PageScript::new(options).source(),
            user_agent: config.user_agent.clone(),
            settle: options.settle(),
            min_content_length: config.min_content_length.max(1),
        })
    }

    async fn render(&self, page: &Page, url: &str) -> Result<PageReport> {
        if let Some(ua) = &self.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| LampstandError::Extraction(format!("user agent: {}", e)))?;
        }

        page.goto(url)
            .await
            .map_err(|e| LampstandError::Transport(format!("{} failed to load: {}", url, e)))?;

        tokio::time::sleep(self.settle).await;

        page.evaluate(self.script.clone())
            .await
            .map_err(|e| LampstandError::Extraction(format!("page script: {}", e)))?
            .into_value()
            .map_err(|e| LampstandError::Extraction(format!("page script result: {:?}", e)))
    }
}

#[async_trait]
impl Extractor for ChromeExtractor {
    async fn extract(&self, url: &str) -> Result<Extraction> {
        let _slot = self
            .pages
            .acquire()
            .await
            .map_err(|e| LampstandError::Extraction(format!("page pool closed: {}", e)))?;

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| LampstandError::Extraction(format!("new page: {}", e)))?;

        let rendered = self.render(&page, url).await;
        if let Err(e) = page.close().await {
            tracing::debug!("Closing page for {} failed: {}", url, e);
        }
        let report = rendered?;

        let text_len = report.text.trim().chars().count();
        if text_len < self.min_content_length {
            return Err(LampstandError::Extraction(format!(
                "no article content at {} ({} chars)",
                url, text_len
            )));
        }

        tracing::debug!("Rendered {} chars from {}", text_len, url);
        Ok(Extraction {
            content: clean_html(&report.html),
            title: report.title,
            description: report.description,
            image: report.image,
            published: report.published,
        })
    }
}
