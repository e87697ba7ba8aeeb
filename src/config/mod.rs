//! Configuration management for Lampstand.
//!
//! Configuration is read from `~/.config/lampstand/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::FeedSource;
use crate::fetcher::http_fetcher::DEFAULT_USER_AGENT;
use crate::scraper::ExtractorConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub scripture: ScriptureConfig,
    pub extractor: ExtractorConfig,
    pub analysis: AnalysisConfig,
    /// Per-category overrides keyed by slug.
    pub categories: HashMap<String, CategoryConfig>,
    /// SQLite database path; defaults to the data directory.
    pub database: Option<PathBuf>,
}

/// Feed fetching.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Feeds fetched at once
    pub workers: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            workers: 10,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How chapters are retrieved from the text source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptureMode {
    /// One bulk request per chapter
    #[default]
    Chapter,
    /// Request verse 1, 2, 3... until the first gap
    Probe,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptureConfig {
    pub base_url: String,
    pub translation: String,
    pub mode: ScriptureMode,
    /// Per verse or per chapter request
    pub timeout_secs: u64,
}

impl Default for ScriptureConfig {
    fn default() -> Self {
        Self {
            base_url: "https://bolls.life".to_string(),
            translation: "NET".to_string(),
            mode: ScriptureMode::Chapter,
            timeout_secs: 10,
        }
    }
}

impl ScriptureConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub endpoint: String,
    pub model: String,
    /// Bounds the connection and each wait for the next token chunk
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "qwen2.5:32b".to_string(),
            timeout_secs: 120,
        }
    }
}

impl AnalysisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Override for one category. Unset fields keep the built-in values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub feeds: Option<Vec<FeedSource>>,
    pub fallback_image: Option<String>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, creating it with defaults if missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/lampstand/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("lampstand").join("config.toml"))
    }

    /// Database path: the configured one, else `<data_dir>/lampstand/lampstand.db`.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(data_dir.join("lampstand").join("lampstand.db"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Lampstand Configuration
#
# Every section is optional; anything left out uses the value shown here.

# Path of the SQLite article cache (default: <data dir>/lampstand/lampstand.db)
# database = "/home/me/.local/share/lampstand/lampstand.db"

[http]
# Per-feed request timeout in seconds
timeout_secs = 10

# Number of feeds fetched at once
workers = 10

user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"

[scripture]
base_url = "https://bolls.life"
translation = "NET"

# "chapter" fetches a whole chapter per request,
# "probe" asks for verse 1, 2, 3... until the first missing verse
mode = "chapter"

# Timeout for each request to the text source, in seconds
timeout_secs = 10

[extractor]
# "http" parses the page HTML directly, "chrome" renders it in headless Chrome
backend = "http"

# Per-article timeout in seconds
timeout_secs = 30

# Extractions with less text than this count as failures
min_content_length = 200

# user_agent = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36"

[extractor.chrome]
headless = true

# Pause after page load for scripted content (milliseconds)
settle_ms = 1000

# Browser pages open at once
pages = 5

# Tried in order; the first with enough text is the article
content_selectors = [
    "article",
    "[role=\"main\"]",
    "main",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".story-body",
    "#content",
    ".content",
]

# Removed before the article is read
strip_selectors = [
    "nav",
    "header",
    "footer",
    "aside",
    "form",
    ".newsletter",
    ".paywall",
    ".advertisement",
    ".ad",
    ".social-share",
    ".comments",
    ".related",
    "script",
    "style",
    "noscript",
]

[analysis]
# Ollama server used for thematic analysis
endpoint = "http://localhost:11434"
model = "qwen2.5:32b"

# Seconds to wait for the connection and for each streamed chunk
timeout_secs = 120

# Categories use built-in feed lists. Override one like this:
#
# [categories.science]
# fallback_image = "https://example.com/science.jpg"
# feeds = [
#     { url = "https://www.sciencedaily.com/rss/all.xml" },
#     { url = "https://phys.org/rss-feed/", name = "Phys.org" },
# ]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
