//! Book/chapter/verse addressing and passage lookup.
//!
//! ```text
//! citation → parser → ChapterSource → PassageResolver
//!                          ↑
//!             address → navigator (next / prev, wrapping)
//! ```

pub mod bolls;
pub mod fetcher;
pub mod index;
pub mod navigator;
pub mod parser;
pub mod resolver;

pub use bolls::BollsClient;
pub use fetcher::{ChapterSource, VerseProber, VerseSource};
pub use navigator::Direction;
pub use resolver::PassageResolver;
