use thiserror::Error;

#[derive(Error, Debug)]
pub enum LampstandError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid reference format: {0}")]
    InvalidFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("{failed} of {total} sources failed")]
    PartialFailure { failed: usize, total: usize },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Paywalled: {0}")]
    Paywalled(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl LampstandError {
    /// True for the failures a caller reports as a plain "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InvalidFormat(_) | Self::NotFound(_))
    }

    /// True for network-level failures that degrade rather than abort.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, LampstandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_covers_format_errors() {
        assert!(LampstandError::InvalidFormat("x".into()).is_not_found());
        assert!(LampstandError::NotFound("x".into()).is_not_found());
        assert!(!LampstandError::Transport("x".into()).is_not_found());
    }

    #[test]
    fn test_partial_failure_message() {
        let err = LampstandError::PartialFailure { failed: 2, total: 5 };
        assert_eq!(err.to_string(), "2 of 5 sources failed");
    }
}
