use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lampstand::app::AppContext;
use lampstand::cli::{commands, Cli, Commands, FavoriteAction};
use lampstand::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "lampstand=debug"
    } else {
        "lampstand=info"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Categories => {
            commands::list_categories(&ctx)?;
        }
        Commands::News {
            category,
            enrich,
            json,
        } => {
            commands::show_news(&ctx, &category, enrich, json).await?;
        }
        Commands::Passage { citation, json } => {
            commands::show_passage(&ctx, &citation.join(" "), json).await?;
        }
        Commands::Navigate {
            book,
            chapter,
            direction,
            json,
        } => {
            commands::navigate(&ctx, &book, chapter, direction, json).await?;
        }
        Commands::Extract { url } => {
            commands::extract_article(&ctx, &url).await?;
        }
        Commands::Analyze { url, category } => {
            commands::analyze_article(&ctx, &url, category.as_deref()).await?;
        }
        Commands::Favorite { action } => match action {
            FavoriteAction::Add { url, note } => {
                commands::add_favorite(&ctx, &url, note.as_deref())?;
            }
            FavoriteAction::List => {
                commands::list_favorites(&ctx)?;
            }
        },
    }

    Ok(())
}
