pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::scripture::Direction;

#[derive(Parser)]
#[command(name = "lampstand")]
#[command(about = "Category news aggregation with scripture cross-references", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/lampstand/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging for lampstand
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the news categories
    Categories,
    /// Show the newest entries of a category
    News {
        /// Category slug, e.g. "world-politics"
        category: String,

        /// Fetch the full text of each entry
        #[arg(long)]
        enrich: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Look up a passage, e.g. "1 Kings 2:3-5"
    Passage {
        /// Citation; quoting is optional
        #[arg(required = true, num_args = 1..)]
        citation: Vec<String>,

        #[arg(long)]
        json: bool,
    },
    /// Show the chapter after or before the given one
    Navigate {
        /// Book name or number (1-66)
        book: String,

        chapter: u16,

        /// "next" or "prev"
        direction: Direction,

        #[arg(long)]
        json: bool,
    },
    /// Extract the full text of an article
    Extract {
        url: String,
    },
    /// Cross-reference an article with scripture
    Analyze {
        url: String,

        /// Category recorded with the article
        #[arg(long)]
        category: Option<String>,
    },
    /// Manage favorite articles
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },
}

#[derive(Subcommand)]
pub enum FavoriteAction {
    /// Mark an article as favorite
    Add {
        url: String,

        /// Personal note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// List favorites, newest first
    List,
}
