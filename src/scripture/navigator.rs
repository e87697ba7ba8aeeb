//! Chapter-by-chapter traversal with wraparound.
//!
//! The 1,189 chapters form a single cycle: the chapter after Revelation 22 is
//! Genesis 1 and the chapter before Genesis 1 is Revelation 22.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::app::{LampstandError, Result};
use crate::domain::Address;
use crate::scripture::index::{self, BOOK_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Prev,
}

impl FromStr for Direction {
    type Err = LampstandError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "next" => Ok(Direction::Next),
            "prev" | "previous" => Ok(Direction::Prev),
            other => Err(LampstandError::InvalidFormat(format!("direction '{}'", other))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => f.write_str("next"),
            Direction::Prev => f.write_str("prev"),
        }
    }
}

impl Address {
    /// Build an address, rejecting books or chapters outside the catalog.
    pub fn new(book: u8, chapter: u16) -> Result<Self> {
        let b = index::lookup(book)?;
        if chapter == 0 || chapter > b.chapters {
            return Err(LampstandError::NotFound(format!(
                "{} has no chapter {}",
                b.name, chapter
            )));
        }
        Ok(Self { book, chapter })
    }

    pub fn first() -> Self {
        Self {
            book: index::first_book().number,
            chapter: 1,
        }
    }

    pub fn last() -> Self {
        let b = index::last_book();
        Self {
            book: b.number,
            chapter: b.chapters,
        }
    }

    /// Human-readable form, e.g. "Genesis 1".
    pub fn label(&self) -> String {
        match index::lookup(self.book) {
            Ok(b) => format!("{} {}", b.name, self.chapter),
            Err(_) => format!("{}:{}", self.book, self.chapter),
        }
    }
}

fn chapters_in(book: u8) -> u16 {
    index::lookup(book).map(|b| b.chapters).unwrap_or(1)
}

pub fn next(address: Address) -> Address {
    if address.chapter < chapters_in(address.book) {
        Address {
            book: address.book,
            chapter: address.chapter + 1,
        }
    } else if address.book < BOOK_COUNT {
        Address {
            book: address.book + 1,
            chapter: 1,
        }
    } else {
        Address::first()
    }
}

pub fn previous(address: Address) -> Address {
    if address.chapter > 1 {
        Address {
            book: address.book,
            chapter: address.chapter - 1,
        }
    } else if address.book > 1 {
        let book = address.book - 1;
        Address {
            book,
            chapter: chapters_in(book),
        }
    } else {
        Address::last()
    }
}

pub fn step(address: Address, direction: Direction) -> Address {
    match direction {
        Direction::Next => next(address),
        Direction::Prev => previous(address),
    }
}
