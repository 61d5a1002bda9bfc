use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use verse_dataset::{BookSplit, Dataset};
use verse_labels::Signal;
use verse_protocol::{Book, BookId};

use crate::ProcessedVerse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerseDiagnostic {
    #[serde(rename = "ref")]
    pub reference: String,
    pub tokens: usize,
    pub unplaced: usize,
    pub flagged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookDiagnostic {
    pub verses: usize,
    pub tokens: usize,
    pub unplaced: usize,
    pub flagged: usize,
    pub split: BookSplit,
}

/// Build report: alignment health, label coverage and the split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub verses: usize,
    pub tokens: usize,
    pub unplaced: usize,
    /// Verses with at least one unplaced token, in corpus order.
    pub unplaced_verses: Vec<VerseDiagnostic>,
    /// Verses over the audit threshold.
    pub flagged: Vec<String>,
    /// Keyed by book code.
    pub books: BTreeMap<String, BookDiagnostic>,
    pub spans_per_category: BTreeMap<String, usize>,
    pub labels_per_signal: BTreeMap<Signal, usize>,
    pub partitions: BTreeMap<String, usize>,
}

/// `GEN 1:1` style reference, falling back to the book ordinal.
pub fn display_ref(books: &BTreeMap<BookId, &Book>, reference: &verse_protocol::VerseRef) -> String {
    match books.get(&reference.book) {
        Some(book) => format!("{} {}:{}", book.code, reference.chapter, reference.verse),
        None => reference.to_string(),
    }
}

impl Diagnostics {
    pub(crate) fn record(&mut self, books: &BTreeMap<BookId, &Book>, verse: &ProcessedVerse) {
        let reference = display_ref(books, &verse.example.reference);
        let code = books
            .get(&verse.example.reference.book)
            .map_or_else(|| verse.example.reference.book.to_string(), |b| b.code.clone());

        self.verses += 1;
        self.tokens += verse.tokens;
        self.unplaced += verse.unplaced;

        let book = self.books.entry(code).or_default();
        book.verses += 1;
        book.tokens += verse.tokens;
        book.unplaced += verse.unplaced;

        if verse.flagged {
            book.flagged += 1;
            self.flagged.push(reference.clone());
        }
        if verse.unplaced > 0 {
            self.unplaced_verses.push(VerseDiagnostic {
                reference,
                tokens: verse.tokens,
                unplaced: verse.unplaced,
                flagged: verse.flagged,
            });
        }

        for span in &verse.example.spans {
            *self.spans_per_category.entry(span.label.clone()).or_default() += 1;
        }
        for (signal, count) in &verse.signals {
            *self.labels_per_signal.entry(*signal).or_default() += count;
        }
    }

    pub(crate) fn record_dataset(&mut self, books: &BTreeMap<BookId, &Book>, dataset: &Dataset) {
        self.partitions = dataset.counts();
        for (id, split) in &dataset.books {
            let code = books.get(id).map_or_else(|| id.to_string(), |b| b.code.clone());
            self.books.entry(code).or_default().split = *split;
        }
    }

    /// Share of tokens that could not be placed.
    pub fn unplaced_ratio(&self) -> f64 {
        if self.tokens == 0 {
            0.0
        } else {
            self.unplaced as f64 / self.tokens as f64
        }
    }
}
