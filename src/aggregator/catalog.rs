use std::collections::HashMap;

use crate::config::CategoryConfig;
use crate::domain::{Category, FeedSource};

const ISRAEL_FEEDS: &[&str] = &[
    "https://www.theguardian.com/world/israel/rss",
    "https://www.theguardian.com/world/middleeast/rss",
    "https://www.timesofisrael.com/feed/",
    "https://www.jpost.com/rss/rssfeedsheadlines.aspx",
    "https://www.i24news.tv/en/rss",
    "https://www.haaretz.com/cmlink/1.628816",
];

const INTERNATIONAL_FEEDS: &[&str] = &[
    "https://www.theguardian.com/world/rss",
    "https://www.theguardian.com/international/rss",
    "https://feeds.bbci.co.uk/news/world/rss.xml",
    "https://feeds.npr.org/1004/rss.xml",
    "https://www.aljazeera.com/xml/rss/all.xml",
];

const WORLD_POLITICS_FEEDS: &[&str] = &[
    "https://www.theguardian.com/politics/rss",
    "https://feeds.npr.org/1014/rss.xml",
    "http://rss.cnn.com/rss/cnn_allpolitics.rss",
    "https://www.politico.com/rss/politics08.xml",
];

const POSITIVE_NEWS_FEEDS: &[&str] = &[
    "https://www.goodnewsnetwork.org/feed/",
    "https://www.positive.news/feed/",
    "https://www.sunnyskyz.com/rss/good-news",
];

const US_PRESIDENT_FEEDS: &[&str] = &[
    "https://www.theguardian.com/us-news/us-politics/rss",
    "https://www.politico.com/rss/politics08.xml",
    "https://www.theatlantic.com/feed/channel/politics/",
    "https://feeds.feedburner.com/breitbart",
    "https://www.whitehouse.gov/feed/",
    "https://thehill.com/feed/",
    "https://nypost.com/politics/feed/",
    "https://www.newsmax.com/rss/Politics/",
    "https://www.salon.com/category/politics/feed/",
    "https://www.dailykos.com/blogs/main.rss",
];

const USA_FEEDS: &[&str] = &[
    "https://www.theguardian.com/us-news/rss",
    "https://feeds.npr.org/1003/rss.xml",
    "http://rssfeeds.usatoday.com/UsatodaycomNation-TopStories",
];

const MINNESOTA_FEEDS: &[&str] = &[
    "https://www.startribune.com/local/index.rss2",
    "https://kstp.com/feed/",
    "https://www.mprnews.org/rss/news",
    "https://bringmethenews.com/feed",
    "https://www.twincities.com/feed/",
    "https://minnesota.cbslocal.com/feed/",
    "https://www.kare11.com/feeds/syndication/rss/news",
    "https://alphanewsmn.com/feed/",
    "https://www.fox9.com/feeds/public/rss/news",
    "https://www.mprnews.org/rss/statewide",
];

const TECHNOPOLY_FEEDS: &[&str] = &[
    "https://feeds.bbci.co.uk/news/technology/rss.xml",
    "https://techcrunch.com/feed/",
    "https://www.wired.com/feed/rss",
    "https://www.theverge.com/rss/index.xml",
    "http://feeds.arstechnica.com/arstechnica/index",
    "https://www.engadget.com/rss.xml",
    "https://www.cnet.com/rss/news/",
    "https://gizmodo.com/rss",
    "https://www.theguardian.com/technology/rss",
];

const SCIENCE_FEEDS: &[&str] = &[
    "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml",
    "https://www.sciencedaily.com/rss/all.xml",
    "https://www.nasa.gov/rss/dyn/breaking_news.rss",
    "http://feeds.nature.com/nature/rss/current",
    "https://www.popsci.com/feed",
    "https://phys.org/rss-feed/",
    "https://www.theguardian.com/science/rss",
];

/// Built-in feed URLs for a category.
pub fn builtin_feeds(category: Category) -> &'static [&'static str] {
    match category {
        Category::Israel => ISRAEL_FEEDS,
        Category::International => INTERNATIONAL_FEEDS,
        Category::WorldPolitics => WORLD_POLITICS_FEEDS,
        Category::PositiveNews => POSITIVE_NEWS_FEEDS,
        Category::UsPresident => US_PRESIDENT_FEEDS,
        Category::Usa => USA_FEEDS,
        Category::Minnesota => MINNESOTA_FEEDS,
        Category::Technopoly => TECHNOPOLY_FEEDS,
        Category::Science => SCIENCE_FEEDS,
    }
}

/// Image used for entries that carry none of their own.
pub fn builtin_fallback_image(category: Category) -> &'static str {
    match category {
        Category::Israel => "https://images.unsplash.com/photo-1544477813-f8e1d0b8e1c0?w=400",
        Category::International => {
            "https://images.unsplash.com/photo-1526778548025-fa2f459cd5c1?w=400"
        }
        Category::WorldPolitics => {
            "https://images.unsplash.com/photo-1529107386315-e1a2ed48a620?w=400"
        }
        Category::PositiveNews => {
            "https://images.unsplash.com/photo-1469571486292-0ba58a3f068b?w=400"
        }
        Category::UsPresident => {
            "https://images.unsplash.com/photo-1580130732478-8b6c9d0d3edf?w=400"
        }
        Category::Usa => "https://images.unsplash.com/photo-1485738422979-f5c462d49f74?w=400",
        Category::Minnesota => "https://images.unsplash.com/photo-1566404394190-cda8c6209208?w=400",
        Category::Technopoly => {
            "https://images.unsplash.com/photo-1518770660439-4636190af475?w=400"
        }
        Category::Science => "https://images.unsplash.com/photo-1532094349884-543bc11b234d?w=400",
    }
}

/// Feed sources and fallback images per category, built-ins merged with
/// any `[categories.<slug>]` overrides from the config file.
#[derive(Debug, Clone)]
pub struct FeedCatalog {
    feeds: HashMap<Category, Vec<FeedSource>>,
    fallback_images: HashMap<Category, String>,
}

impl Default for FeedCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FeedCatalog {
    pub fn builtin() -> Self {
        let mut feeds = HashMap::new();
        let mut fallback_images = HashMap::new();

        for category in Category::ALL {
            feeds.insert(
                category,
                builtin_feeds(category)
                    .iter()
                    .map(|url| FeedSource::new(*url))
                    .collect(),
            );
            fallback_images.insert(category, builtin_fallback_image(category).to_string());
        }

        Self {
            feeds,
            fallback_images,
        }
    }

    /// Apply overrides keyed by category slug. Unknown slugs are skipped.
    pub fn with_overrides(mut self, overrides: &HashMap<String, CategoryConfig>) -> Self {
        for (slug, category_config) in overrides {
            let Ok(category) = slug.parse::<Category>() else {
                tracing::warn!("Ignoring config for unknown category '{}'", slug);
                continue;
            };

            if let Some(feeds) = &category_config.feeds {
                self.feeds.insert(category, feeds.clone());
            }
            if let Some(image) = &category_config.fallback_image {
                self.fallback_images.insert(category, image.clone());
            }
        }
        self
    }

    /// Replace the sources of one category.
    pub fn set_feeds(&mut self, category: Category, feeds: Vec<FeedSource>) {
        self.feeds.insert(category, feeds);
    }

    pub fn feeds(&self, category: Category) -> &[FeedSource] {
        self.feeds.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fallback_image(&self, category: Category) -> &str {
        self.fallback_images
            .get(&category)
            .map(String::as_str)
            .unwrap_or_else(|| builtin_fallback_image(Category::International))
    }
}
