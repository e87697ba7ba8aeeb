use serde::{Deserialize, Serialize};

/// One numbered verse of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub number: u16,
    pub text: String,
}

impl Verse {
    pub fn new(number: u16, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// A (book, chapter) position used for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub book: u8,
    pub chapter: u16,
}

/// A parsed citation such as `John 3:16-18`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Citation {
    pub book: u8,
    pub chapter: u16,
    pub verse: u16,
    pub end_verse: Option<u16>,
}

impl Citation {
    pub fn address(&self) -> Address {
        Address {
            book: self.book,
            chapter: self.chapter,
        }
    }

    /// Inclusive verse range the citation asks for.
    pub fn verse_range(&self) -> std::ops::RangeInclusive<u16> {
        self.verse..=self.end_verse.unwrap_or(self.verse)
    }
}

/// The answer to "what does this citation say".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPassage {
    pub reference: String,
    pub text: String,
    pub full_chapter: Vec<Verse>,
    pub requested_verses: Vec<u16>,
    pub book_number: u8,
    pub chapter_number: u16,
}

/// A whole chapter reached by next/previous navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterView {
    pub full_chapter: Vec<Verse>,
    pub book_number: u8,
    pub chapter_number: u16,
}
