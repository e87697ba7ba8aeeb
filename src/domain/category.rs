use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::app::LampstandError;

/// Topic categories that news is aggregated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Israel,
    International,
    WorldPolitics,
    PositiveNews,
    UsPresident,
    Usa,
    Minnesota,
    Technopoly,
    Science,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Israel,
        Category::International,
        Category::WorldPolitics,
        Category::PositiveNews,
        Category::UsPresident,
        Category::Usa,
        Category::Minnesota,
        Category::Technopoly,
        Category::Science,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Category::Israel => "israel",
            Category::International => "international",
            Category::WorldPolitics => "world-politics",
            Category::PositiveNews => "positive-news",
            Category::UsPresident => "us-president",
            Category::Usa => "usa",
            Category::Minnesota => "minnesota",
            Category::Technopoly => "technopoly",
            Category::Science => "science",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Israel => "Israel",
            Category::International => "World News",
            Category::WorldPolitics => "World Politics",
            Category::PositiveNews => "Positive News",
            Category::UsPresident => "US President",
            Category::Usa => "USA",
            Category::Minnesota => "Minnesota",
            Category::Technopoly => "Technopoly",
            Category::Science => "Science",
        }
    }
}

/// One configured feed URL with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl FeedSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
        }
    }

    pub fn named(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: Some(name.into()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = LampstandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == wanted)
            .ok_or_else(|| LampstandError::NotFound(format!("category '{}'", s)))
    }
}
