//! # Lampstand
//!
//! Category news aggregation with scripture cross-references.
//!
//! ## Architecture
//!
//! Lampstand is built from three small pipelines:
//!
//! ```text
//! Fetcher → Normalizer → Aggregator → Enricher (ArticleCache + Extractor)
//! Parser → ChapterSource → PassageResolver (+ Navigator)
//! Generator → Analyzer (ArticleCache + PassageResolver)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Newest science stories, with full text
//! lampstand news science --enrich
//!
//! # Look up a passage and its chapter
//! lampstand passage "1 Kings 2:3-5"
//!
//! # The chapter after Revelation 22 (wraps to Genesis 1)
//! lampstand navigate Revelation 22 next
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// store, aggregator, resolver, extractor and analyzer.
pub mod app;

/// Per-category aggregation: fan-out fetch, dedupe, fallback images, newest ten.
pub mod aggregator;

/// Article analysis through a streaming text generator.
pub mod analysis;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/lampstand/config.toml`.
pub mod config;

/// Plain data types shared by the pipelines.
pub mod domain;

/// HTTP fetching of feed payloads.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// Feed parsing and normalization.
///
/// Converts RSS 0.9x/1.0/2.0, Atom 0.3/1.0, and JSON Feed 1.0
/// into [`FeedEntry`](domain::FeedEntry) values.
pub mod normalizer;

/// Full-article extraction and the negative-caching enrichment pipeline.
pub mod scraper;

/// Book index, citation parser, chapter sources, navigator and resolver.
pub mod scripture;

/// SQLite article cache.
///
/// - [`ArticleCache`](store::ArticleCache): Trait defining cache operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
