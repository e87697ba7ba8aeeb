use std::sync::LazyLock;

use regex::Regex;

use crate::app::{LampstandError, Result};
use crate::domain::Citation;
use crate::scripture::index;

static CITATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+(\d+)\s*:\s*(\d+)(?:\s*[-–]\s*(\d+))?$").unwrap()
});

/// Parse `"<book> <chapter>:<verse>[-<verse>]"` against the book index.
///
/// Chapter and verse numbers are not range-checked here; a chapter or verse
/// that does not exist simply yields no content when fetched.
pub fn parse(reference: &str) -> Result<Citation> {
    let invalid = || LampstandError::InvalidFormat(reference.to_string());

    let caps = CITATION_RE.captures(reference.trim()).ok_or_else(invalid)?;

    let name = &caps[1];
    if !name.chars().any(char::is_alphabetic) {
        return Err(invalid());
    }

    let chapter = positive(&caps[2]).ok_or_else(invalid)?;
    let verse = positive(&caps[3]).ok_or_else(invalid)?;
    let end_verse = match caps.get(4) {
        Some(m) => Some(positive(m.as_str()).ok_or_else(invalid)?),
        None => None,
    };

    if end_verse.is_some_and(|end| end < verse) {
        return Err(invalid());
    }

    let book = index::lookup_by_name(name)?;

    Ok(Citation {
        book: book.number,
        chapter,
        verse,
        end_verse,
    })
}

fn positive(digits: &str) -> Option<u16> {
    digits.parse::<u16>().ok().filter(|n| *n > 0)
}
