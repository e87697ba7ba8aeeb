pub mod article;
pub mod category;
pub mod entry;
pub mod passage;

pub use article::{Analysis, ArticleRecord, Favorite};
pub use category::{Category, FeedSource};
pub use entry::{EnrichedEntry, FeedEntry};
pub use passage::{Address, ChapterView, Citation, ResolvedPassage, Verse};
