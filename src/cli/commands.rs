use serde::Serialize;

use crate::analysis::AnalysisRequest;
use crate::app::{AppContext, Result};
use crate::domain::{Address, ArticleRecord, Category, ChapterView, FeedEntry, ResolvedPassage, Verse};
use crate::scraper::html_to_text;
use crate::scripture::{index, Direction};
use crate::store::ArticleCache;

const NOT_FOUND: &str = "passage not found";

pub fn list_categories(ctx: &AppContext) -> Result<()> {
    for category in Category::ALL {
        println!(
            "{:<16} {} ({} feeds)",
            category.slug(),
            category.label(),
            ctx.aggregator.catalog().feeds(category).len()
        );
    }
    Ok(())
}

pub async fn show_news(ctx: &AppContext, category: &str, enrich: bool, json: bool) -> Result<()> {
    let entries = ctx.aggregator.aggregate(category).await;

    let parsed = category.parse::<Category>().ok();
    if parsed.is_none() {
        tracing::warn!("Unknown category '{}'", category);
    }

    match parsed.filter(|_| enrich) {
        Some(category) => {
            let enricher = ctx.enricher().await?;
            let enriched = enricher.enrich_all(entries, category).await;

            if json {
                return print_json(&enriched);
            }
            if enriched.is_empty() {
                println!("No entries");
            }
            for item in &enriched {
                let marker = if item.extraction_failed {
                    "!"
                } else if item.full_content.is_some() {
                    "+"
                } else {
                    " "
                };
                print_entry_line(marker, &item.entry);
                println!("    {}", truncate(&html_to_text(item.best_text()), 160));
            }
        }
        None => {
            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No entries");
            }
            for entry in &entries {
                print_entry_line(" ", entry);
                let summary = entry.plain_summary();
                if !summary.is_empty() {
                    println!("    {}", truncate(&summary, 160));
                }
            }
        }
    }

    Ok(())
}

fn print_entry_line(marker: &str, entry: &FeedEntry) {
    let date = entry
        .published_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "          ".to_string());
    println!("{} {} {} [{}]", marker, date, entry.display_title(), entry.source);
    println!("    {}", entry.link);
}

pub async fn show_passage(ctx: &AppContext, citation: &str, json: bool) -> Result<()> {
    match ctx.resolver.resolve(citation).await {
        Ok(passage) => {
            if json {
                return print_json(&passage);
            }
            print_passage(&passage);
        }
        Err(e) => {
            tracing::debug!("Resolving '{}' failed: {}", citation, e);
            println!("{}", NOT_FOUND);
        }
    }
    Ok(())
}

fn print_passage(passage: &ResolvedPassage) {
    println!("{}", passage.reference);
    println!("{}", passage.text);
    println!();
    let label = Address {
        book: passage.book_number,
        chapter: passage.chapter_number,
    }
    .label();
    println!("{}", label);
    print_verses(&passage.full_chapter, &passage.requested_verses);
}

fn print_verses(verses: &[Verse], highlighted: &[u16]) {
    for verse in verses {
        let marker = if highlighted.contains(&verse.number) { ">" } else { " " };
        println!("{} {:>3} {}", marker, verse.number, verse.text);
    }
}

pub async fn navigate(
    ctx: &AppContext,
    book: &str,
    chapter: u16,
    direction: Direction,
    json: bool,
) -> Result<()> {
    let view = match resolve_book(book).and_then(|b| Address::new(b, chapter)) {
        Ok(address) => ctx.resolver.navigate(address, direction).await,
        Err(e) => Err(e),
    };

    match view {
        Ok(view) => {
            if json {
                return print_json(&view);
            }
            print_chapter(&view);
        }
        Err(e) => {
            tracing::debug!("Navigating {} from {} {} failed: {}", direction, book, chapter, e);
            println!("{}", NOT_FOUND);
        }
    }
    Ok(())
}

fn print_chapter(view: &ChapterView) {
    let label = Address {
        book: view.book_number,
        chapter: view.chapter_number,
    }
    .label();
    println!("{}", label);
    print_verses(&view.full_chapter, &[]);
}

/// A book number (1-66) or any accepted book name.
fn resolve_book(book: &str) -> Result<u8> {
    match book.trim().parse::<u8>() {
        Ok(number) => index::lookup(number).map(|b| b.number),
        Err(_) => index::lookup_by_name(book).map(|b| b.number),
    }
}

pub async fn extract_article(ctx: &AppContext, url: &str) -> Result<()> {
    let extractor = ctx.extractor().await?;
    let extraction = extractor.extract(url).await?;

    if let Some(title) = &extraction.title {
        println!("{}", title);
    }
    if let Some(published) = &extraction.published {
        println!("Published: {}", published);
    }
    if let Some(image) = &extraction.image {
        println!("Image: {}", image);
    }
    println!();
    println!("{}", html_to_text(&extraction.content));
    Ok(())
}

pub async fn analyze_article(ctx: &AppContext, url: &str, category: Option<&str>) -> Result<()> {
    let category = category.map(str::parse::<Category>).transpose()?;
    let (title, text) = article_text(ctx, url).await?;

    let analyzer = ctx.analyzer()?;
    println!("Analyzing {}...", title);
    let report = analyzer
        .analyze(AnalysisRequest {
            url: url.to_string(),
            title,
            text,
            category,
        })
        .await?;

    if report.cached {
        println!("(stored analysis)");
    }

    let Some(payload) = &report.payload else {
        println!("{}", report.response);
        return Ok(());
    };

    for theme in &payload.themes {
        println!();
        println!("## {}", theme.name);
        for link in &theme.passages {
            let prophetic = if link.is_prophetic { " [prophetic]" } else { "" };
            println!("- {}{}: {}", link.reference, prophetic, link.connection);

            let resolved = report
                .passages
                .iter()
                .find(|(reference, _)| reference == link.reference.trim())
                .and_then(|(_, passage)| passage.as_ref());
            match resolved {
                Some(passage) => println!("    \"{}\"", passage.text),
                None => println!("    ({})", NOT_FOUND),
            }
        }
    }

    Ok(())
}

/// Title and plain text for an article: from the cache when extracted
/// before, else from a live extraction.
async fn article_text(ctx: &AppContext, url: &str) -> Result<(String, String)> {
    if let Some(article) = ctx.store.get_article_by_url(url)? {
        let text = article
            .full_content
            .as_deref()
            .or(article.content.as_deref())
            .map(html_to_text)
            .unwrap_or_default();
        if !text.is_empty() {
            return Ok((article.title, text));
        }
    }

    let extraction = ctx.extractor().await?.extract(url).await?;
    let title = extraction.title.clone().unwrap_or_else(|| url.to_string());
    Ok((title, html_to_text(&extraction.content)))
}

pub fn add_favorite(ctx: &AppContext, url: &str, note: Option<&str>) -> Result<()> {
    let article_id = match ctx.store.get_article_by_url(url)? {
        Some(article) => article.id,
        None => ctx
            .store
            .upsert_article(&ArticleRecord::new(url, "unknown", url))?,
    };

    ctx.store.add_favorite(article_id, note)?;
    println!("Added favorite: {}", url);
    Ok(())
}

pub fn list_favorites(ctx: &AppContext) -> Result<()> {
    let favorites = ctx.store.favorites()?;
    if favorites.is_empty() {
        println!("No favorites");
        return Ok(());
    }

    for favorite in favorites {
        println!(
            "{} {} [{}]",
            favorite.created_at.format("%Y-%m-%d"),
            favorite.article.title,
            favorite.article.category
        );
        println!("    {}", favorite.article.url);
        if let Some(note) = favorite.user_note {
            println!("    note: {}", note);
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
