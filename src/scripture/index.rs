//! Static catalog of the 66 books and their chapter counts.
//!
//! Name lookup goes through one alias table built on first use. Every book
//! answers to its full name and a three-letter abbreviation; numbered books
//! also answer to spaced and unspaced numeric-prefix forms ("1 Samuel",
//! "1samuel", "1 sam", "1sam"). Anything else is rejected.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::app::{LampstandError, Result};

pub const BOOK_COUNT: u8 = 66;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    pub name: &'static str,
    pub number: u8,
    pub chapters: u16,
}

const fn book(name: &'static str, number: u8, chapters: u16) -> Book {
    Book {
        name,
        number,
        chapters,
    }
}

static BOOKS: [Book; BOOK_COUNT as usize] = [
    book("Genesis", 1, 50),
    book("Exodus", 2, 40),
    book("Leviticus", 3, 27),
    book("Numbers", 4, 36),
    book("Deuteronomy", 5, 34),
    book("Joshua", 6, 24),
    book("Judges", 7, 21),
    book("Ruth", 8, 4),
    book("1 Samuel", 9, 31),
    book("2 Samuel", 10, 24),
    book("1 Kings", 11, 22),
    book("2 Kings", 12, 25),
    book("1 Chronicles", 13, 29),
    book("2 Chronicles", 14, 36),
    book("Ezra", 15, 10),
    book("Nehemiah", 16, 13),
    book("Esther", 17, 10),
    book("Job", 18, 42),
    book("Psalms", 19, 150),
    book("Proverbs", 20, 31),
    book("Ecclesiastes", 21, 12),
    book("Song of Solomon", 22, 8),
    book("Isaiah", 23, 66),
    book("Jeremiah", 24, 52),
    book("Lamentations", 25, 5),
    book("Ezekiel", 26, 48),
    book("Daniel", 27, 12),
    book("Hosea", 28, 14),
    book("Joel", 29, 3),
    book("Amos", 30, 9),
    book("Obadiah", 31, 1),
    book("Jonah", 32, 4),
    book("Micah", 33, 7),
    book("Nahum", 34, 3),
    book("Habakkuk", 35, 3),
    book("Zephaniah", 36, 3),
    book("Haggai", 37, 2),
    book("Zechariah", 38, 14),
    book("Malachi", 39, 4),
    book("Matthew", 40, 28),
    book("Mark", 41, 16),
    book("Luke", 42, 24),
    book("John", 43, 21),
    book("Acts", 44, 28),
    book("Romans", 45, 16),
    book("1 Corinthians", 46, 16),
    book("2 Corinthians", 47, 13),
    book("Galatians", 48, 6),
    book("Ephesians", 49, 6),
    book("Philippians", 50, 4),
    book("Colossians", 51, 4),
    book("1 Thessalonians", 52, 5),
    book("2 Thessalonians", 53, 3),
    book("1 Timothy", 54, 6),
    book("2 Timothy", 55, 4),
    book("Titus", 56, 3),
    book("Philemon", 57, 1),
    book("Hebrews", 58, 13),
    book("James", 59, 5),
    book("1 Peter", 60, 5),
    book("2 Peter", 61, 3),
    book("1 John", 62, 5),
    book("2 John", 63, 1),
    book("3 John", 64, 1),
    book("Jude", 65, 1),
    book("Revelation", 66, 22),
];

/// Abbreviations for books without a numeric prefix.
const SIMPLE_ALIASES: &[(u8, &[&str])] = &[
    (1, &["gen", "ge", "gn"]),
    (2, &["exo", "exod", "ex"]),
    (3, &["lev", "lv"]),
    (4, &["num", "nm", "nb"]),
    (5, &["deu", "deut", "dt"]),
    (6, &["jos", "josh"]),
    (7, &["jdg", "judg", "jg"]),
    (8, &["rut", "ru", "rth"]),
    (15, &["ezr"]),
    (16, &["neh", "ne"]),
    (17, &["est", "esth"]),
    (18, &["job", "jb"]),
    (19, &["psa", "ps", "psalm", "pss", "psm"]),
    (20, &["pro", "prov", "prv", "pr"]),
    (21, &["ecc", "eccl", "eccles", "qoh"]),
    (22, &["sng", "song", "sos", "song of songs", "canticles"]),
    (23, &["isa", "is"]),
    (24, &["jer", "je"]),
    (25, &["lam", "la"]),
    (26, &["ezk", "ezek", "eze"]),
    (27, &["dan", "dn", "da"]),
    (28, &["hos", "ho"]),
    (29, &["jol", "joe", "jl"]),
    (30, &["amo", "am"]),
    (31, &["oba", "obad", "ob"]),
    (32, &["jon", "jnh"]),
    (33, &["mic", "mc"]),
    (34, &["nam", "nah", "na"]),
    (35, &["hab", "hb"]),
    (36, &["zep", "zeph", "zp"]),
    (37, &["hag", "hg"]),
    (38, &["zec", "zech", "zc"]),
    (39, &["mal", "ml"]),
    (40, &["mat", "matt", "mt"]),
    (41, &["mrk", "mar", "mk", "mr"]),
    (42, &["luk", "lk"]),
    (43, &["jhn", "jn", "joh"]),
    (44, &["act", "ac"]),
    (45, &["rom", "ro", "rm"]),
    (48, &["gal", "ga"]),
    (49, &["eph", "ephes"]),
    (50, &["php", "phil", "phl"]),
    (51, &["col", "co"]),
    (56, &["tit", "ti"]),
    (57, &["phm", "phlm", "philem"]),
    (58, &["heb"]),
    (59, &["jas", "jam", "jm"]),
    (65, &["jud", "jde"]),
    (66, &["rev", "re", "rv"]),
];

/// Stem abbreviations for numbered books, combined with the numeric prefix.
const NUMBERED_STEMS: &[(u8, &[&str])] = &[
    (9, &["sa", "sam", "sm"]),
    (10, &["sa", "sam", "sm"]),
    (11, &["ki", "kgs", "kin"]),
    (12, &["ki", "kgs", "kin"]),
    (13, &["ch", "chr", "chron"]),
    (14, &["ch", "chr", "chron"]),
    (46, &["co", "cor"]),
    (47, &["co", "cor"]),
    (52, &["th", "thes", "thess"]),
    (53, &["th", "thes", "thess"]),
    (54, &["ti", "tim"]),
    (55, &["ti", "tim"]),
    (60, &["pe", "pet", "pt"]),
    (61, &["pe", "pet", "pt"]),
    (62, &["jn", "jhn", "joh"]),
    (63, &["jn", "jhn", "joh"]),
    (64, &["jn", "jhn", "joh"]),
];

static ALIASES: LazyLock<HashMap<String, u8>> = LazyLock::new(build_aliases);

fn build_aliases() -> HashMap<String, u8> {
    let mut map = HashMap::new();

    for b in &BOOKS {
        let full = b.name.to_lowercase();
        if let Some((prefix, stem)) = split_numbered(&full) {
            map.insert(format!("{} {}", prefix, stem), b.number);
            map.insert(format!("{}{}", prefix, stem), b.number);
        } else {
            map.insert(full, b.number);
        }
    }

    for (number, aliases) in SIMPLE_ALIASES {
        for alias in *aliases {
            map.insert((*alias).to_string(), *number);
        }
    }

    for (number, stems) in NUMBERED_STEMS {
        let prefix = BOOKS[*number as usize - 1]
            .name
            .split(' ')
            .next()
            .unwrap_or_default();
        for stem in *stems {
            map.insert(format!("{} {}", prefix, stem), *number);
            map.insert(format!("{}{}", prefix, stem), *number);
        }
    }

    map
}

/// Split "1 samuel" into ("1", "samuel").
fn split_numbered(name: &str) -> Option<(&str, &str)> {
    let (prefix, stem) = name.split_once(' ')?;
    prefix
        .chars()
        .all(|c| c.is_ascii_digit())
        .then_some((prefix, stem))
}

/// Canonical alias key: lower-cased, single spaces, no trailing period.
fn alias_key(name: &str) -> String {
    name.trim()
        .trim_end_matches('.')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn books() -> &'static [Book] {
    &BOOKS
}

pub fn lookup(number: u8) -> Result<&'static Book> {
    number
        .checked_sub(1)
        .and_then(|i| BOOKS.get(i as usize))
        .ok_or_else(|| LampstandError::NotFound(format!("book number {}", number)))
}

pub fn lookup_by_name(name: &str) -> Result<&'static Book> {
    ALIASES
        .get(&alias_key(name))
        .and_then(|number| lookup(*number).ok())
        .ok_or_else(|| LampstandError::NotFound(format!("book '{}'", name.trim())))
}

pub fn first_book() -> &'static Book {
    &BOOKS[0]
}

pub fn last_book() -> &'static Book {
    &BOOKS[BOOKS.len() - 1]
}

/// Total number of chapters across all books.
pub fn total_chapters() -> u32 {
    BOOKS.iter().map(|b| u32::from(b.chapters)).sum()
}
