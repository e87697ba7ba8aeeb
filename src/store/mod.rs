pub mod sqlite;

use crate::app::Result;
use crate::domain::{Analysis, ArticleRecord, Favorite};

pub use sqlite::SqliteStore;

/// Article cache shared by enrichment and analysis.
pub trait ArticleCache {
    // Article operations
    fn get_article_by_url(&self, url: &str) -> Result<Option<ArticleRecord>>;
    /// Insert, or update the row with the same URL. Content, description
    /// and image only overwrite stored values when present. Returns the row id.
    fn upsert_article(&self, article: &ArticleRecord) -> Result<i64>;
    fn update_image(&self, url: &str, image_url: &str) -> Result<()>;

    // Analysis operations
    fn save_analysis(&self, article_id: i64, response: &str) -> Result<i64>;
    fn latest_analysis(&self, article_id: i64) -> Result<Option<Analysis>>;

    // Favorite operations
    fn add_favorite(&self, article_id: i64, note: Option<&str>) -> Result<i64>;
    fn favorites(&self) -> Result<Vec<Favorite>>;
}
