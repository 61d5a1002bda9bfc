use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use rkyv::{Archive, Deserialize, Serialize};

use crate::ids::{BookId, VerseRef};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Book {
    pub id: BookId,
    /// Short code used by selectors and reports (`GEN`, `JHN`).
    pub code: String,
    pub name: String,
}

/// One annotated word as produced by the structured parse of the source.
///
/// Missing annotations are `None`; loaders must not substitute sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Token {
    pub text: String,
    pub root_id: Option<String>,
    pub morph: Option<String>,
    pub root_form: Option<String>,
}

impl Token {
    /// Token with surface text only.
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            root_id: None,
            morph: None,
            root_form: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Verse {
    pub reference: VerseRef,
    pub raw_text: String,
    pub clean_text: String,
    /// Reading order. Alignment and span merging depend on it.
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Corpus {
    pub version: u32,
    pub books: Vec<Book>,
    pub verses: Vec<Verse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusError {
    DuplicateBookId(BookId),
    DuplicateBookCode(String),
    UnknownBook(VerseRef),
    DuplicateVerse(VerseRef),
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusError::DuplicateBookId(id) => write!(f, "book id {} declared more than once", id.0),
            CorpusError::DuplicateBookCode(code) => write!(f, "book code '{}' declared more than once", code),
            CorpusError::UnknownBook(r) => write!(f, "verse {} references a book missing from the book table", r),
            CorpusError::DuplicateVerse(r) => write!(f, "verse {} appears more than once", r),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CorpusError {}

impl Corpus {
    /// Checks the structural invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), CorpusError> {
        let mut ids = BTreeSet::new();
        let mut codes = BTreeSet::new();
        for book in &self.books {
            if !ids.insert(book.id) {
                return Err(CorpusError::DuplicateBookId(book.id));
            }
            // Selectors resolve codes case-insensitively
            if !codes.insert(book.code.to_ascii_uppercase()) {
                return Err(CorpusError::DuplicateBookCode(book.code.clone()));
            }
        }

        let mut seen = BTreeSet::new();
        for verse in &self.verses {
            if !ids.contains(&verse.reference.book) {
                return Err(CorpusError::UnknownBook(verse.reference));
            }
            if !seen.insert(verse.reference) {
                return Err(CorpusError::DuplicateVerse(verse.reference));
            }
        }
        Ok(())
    }
}

/// Half-open `[start, end)` range in character offsets of a verse text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct CharRange {
    pub start: usize,
    pub end: usize,
}

impl CharRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A labeled, non-overlapping range of one verse's text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Span {
    pub reference: VerseRef,
    pub range: CharRange,
    pub label: String,
}

/// The atomic training unit: one verse text and its spans.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Example {
    pub reference: VerseRef,
    pub text: String,
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Partition {
    pub name: String,
    pub examples: Vec<Example>,
}

impl Partition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            examples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}
