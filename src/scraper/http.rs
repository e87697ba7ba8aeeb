use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};

use crate::app::{LampstandError, Result};
use crate::fetcher::http_fetcher::DEFAULT_USER_AGENT;
use crate::scraper::config::ExtractorConfig;
use crate::scraper::{clean_html, Extraction, Extractor};

static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<article\b[^>]*>(.*)</article\s*>").unwrap());
static MAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<main\b[^>]*>(.*)</main\s*>").unwrap());
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").unwrap());
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap());
static META_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").unwrap());
static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)([a-z:_-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Extractor that parses the fetched page HTML without a browser.
pub struct HttpExtractor {
    client: Client,
    min_content_length: usize,
}

impl HttpExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .build()?;

        Ok(Self {
            client,
            min_content_length: config.min_content_length,
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LampstandError::Transport(format!("{} timed out", url))
            } else {
                LampstandError::Http(e)
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LampstandError::Paywalled(format!("{} returned {}", url, status)));
        }
        if !status.is_success() {
            return Err(LampstandError::Transport(format!("{} returned {}", url, status)));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<Extraction> {
        let html = self.fetch_page(url).await?;
        let extraction = parse_page(&html);

        let text_len = extraction.text_len();
        if text_len == 0 || text_len < self.min_content_length {
            return Err(LampstandError::Extraction(format!(
                "no article content at {} ({} chars)",
                url, text_len
            )));
        }

        tracing::debug!("Extracted {} chars from {}", text_len, url);
        Ok(extraction)
    }
}

/// Pull the article region and its metadata out of a full HTML document.
pub(crate) fn parse_page(html: &str) -> Extraction {
    let region = [&*ARTICLE_RE, &*MAIN_RE, &*BODY_RE]
        .iter()
        .find_map(|re| re.captures(html).and_then(|c| c.get(1)))
        .map(|m| m.as_str())
        .unwrap_or(html);

    let meta = meta_tags(html);
    let lookup = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| meta.get(*k))
            .map(|v| html_escape::decode_html_entities(v.trim()).to_string())
            .filter(|v| !v.is_empty())
    };

    let title = lookup(&["og:title", "twitter:title"]).or_else(|| {
        TITLE_RE
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| html_escape::decode_html_entities(m.as_str().trim()).to_string())
            .filter(|t| !t.is_empty())
    });

    Extraction {
        content: clean_html(region),
        title,
        description: lookup(&["og:description", "description", "twitter:description"]),
        image: lookup(&["og:image", "og:image:url", "twitter:image"]),
        published: lookup(&["article:published_time", "og:published_time", "date"]),
    }
}

/// `<meta>` tags keyed by their lower-cased `property` or `name`.
fn meta_tags(html: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();

    for tag in META_RE.find_iter(html) {
        let attrs: HashMap<String, String> = ATTR_RE
            .captures_iter(tag.as_str())
            .filter_map(|c| {
                let name = c.get(1)?.as_str().to_lowercase();
                let value = c.get(2).or_else(|| c.get(3))?.as_str().to_string();
                Some((name, value))
            })
            .collect();

        let key = attrs.get("property").or_else(|| attrs.get("name"));
        if let (Some(key), Some(content)) = (key, attrs.get("content")) {
            tags.entry(key.to_lowercase()).or_insert_with(|| content.clone());
        }
    }

    tags
}
