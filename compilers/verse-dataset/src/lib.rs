//! Dataset assembly: holdout routing and a per-book stratified split.

pub mod holdout;
pub mod selector;
pub mod split;

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use verse_protocol::{Book, BookId, Example, Partition};

pub use holdout::HoldoutConfig;
pub use selector::{parse_selector, ResolvedSelector, Selector};
pub use split::{allocate, book_rng, SplitRatios};

pub const TRAIN: &str = "train";
pub const DEV: &str = "dev";
pub const TEST: &str = "test";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid split ratios: {0}")]
    InvalidRatios(String),
    #[error("cannot parse holdout selector {selector:?}")]
    InvalidSelector { selector: String },
    #[error("holdout selector {selector:?} names unknown book {code:?}")]
    UnknownBook { selector: String, code: String },
    #[error("holdout name is empty")]
    EmptyHoldoutName,
    #[error("holdout name {0:?} may only contain ASCII letters, digits, '_' and '-'")]
    InvalidHoldoutName(String),
    #[error("holdout name {0:?} is reserved")]
    ReservedName(String),
    #[error("holdout {0:?} declared twice")]
    DuplicateHoldout(String),
    #[error("no examples left to split after holdouts")]
    EmptyPool,
    #[error("holdouts claim every verse of {book}, leaving nothing to split")]
    EmptyStratum { book: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub ratios: SplitRatios,
    pub seed: u64,
    pub holdouts: Vec<HoldoutConfig>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            ratios: SplitRatios::default(),
            seed: 42,
            holdouts: Vec::new(),
        }
    }
}

impl DatasetConfig {
    /// Checks ratios and holdouts against the book table before any verse is processed.
    pub fn validate(&self, books: &[Book]) -> Result<(), DatasetError> {
        self.ratios.validate()?;
        holdout::compile(&self.holdouts, books).map(|_| ())
    }
}

/// Where one book's verses went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSplit {
    pub total: usize,
    pub train: usize,
    pub dev: usize,
    pub test: usize,
    pub held_out: usize,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    /// `train`, `dev`, `test`, then holdouts in declaration order.
    pub partitions: Vec<Partition>,
    pub books: BTreeMap<BookId, BookSplit>,
}

impl Dataset {
    pub fn partition(&self, name: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.name == name)
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.partitions.iter().map(|p| (p.name.clone(), p.len())).collect()
    }
}

/// Routes examples into holdouts, then splits each remaining book by the
/// configured ratios.
///
/// Every partition lists books in canon order and, within a book, keeps the
/// order `examples` arrived in.
/// A verse matched by several holdouts goes to the first one declared.
pub fn assemble(examples: Vec<Example>, books: &[Book], config: &DatasetConfig) -> Result<Dataset, DatasetError> {
    config.ratios.validate()?;
    let holdouts = holdout::compile(&config.holdouts, books)?;

    let mut held: Vec<Partition> = holdouts.iter().map(|h| Partition::new(h.name.clone())).collect();
    let mut strata: BTreeMap<BookId, Vec<Example>> = BTreeMap::new();
    let mut report: BTreeMap<BookId, BookSplit> = BTreeMap::new();
    let mut trimmed_books = BTreeSet::new();

    for example in examples {
        let book = example.reference.book;
        let entry = report.entry(book).or_default();
        entry.total += 1;

        match holdouts.iter().position(|h| h.claims(&example.reference)) {
            Some(index) => {
                entry.held_out += 1;
                if !holdouts[index].claims_whole_book(&example.reference) {
                    trimmed_books.insert(book);
                }
                held[index].examples.push(example);
            }
            None => strata.entry(book).or_default().push(example),
        }
    }

    if let Some(book) = trimmed_books.iter().find(|b| !strata.contains_key(b)) {
        let code = books
            .iter()
            .find(|b| b.id == *book)
            .map_or_else(|| book.to_string(), |b| b.code.clone());
        return Err(DatasetError::EmptyStratum { book: code });
    }
    if strata.is_empty() {
        return Err(DatasetError::EmptyPool);
    }

    let mut splits = [Partition::new(TRAIN), Partition::new(DEV), Partition::new(TEST)];
    for (book, verses) in strata {
        let counts = allocate(verses.len(), &config.ratios, book.0 as usize);

        let mut order: Vec<usize> = (0..verses.len()).collect();
        order.shuffle(&mut book_rng(config.seed, book));
        let mut slot = vec![0usize; verses.len()];
        for (rank, &index) in order.iter().enumerate() {
            slot[index] = if rank < counts[0] {
                0
            } else if rank < counts[0] + counts[1] {
                1
            } else {
                2
            };
        }

        for (example, target) in verses.into_iter().zip(slot) {
            splits[target].examples.push(example);
        }

        let entry = report.entry(book).or_default();
        entry.train = counts[0];
        entry.dev = counts[1];
        entry.test = counts[2];
        tracing::debug!(%book, train = counts[0], dev = counts[1], test = counts[2], "split book");
    }

    for partition in &mut held {
        partition.examples.sort_by_key(|e| e.reference.book);
    }
    let mut partitions: Vec<Partition> = splits.into_iter().collect();
    partitions.extend(held);
    tracing::info!(
        partitions = partitions.len(),
        books = report.len(),
        "dataset assembled"
    );

    Ok(Dataset {
        partitions,
        books: report,
    })
}
