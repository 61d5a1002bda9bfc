//! End-to-end build: align, label and merge every verse, then assemble the dataset.

pub mod config;
pub mod diagnostics;
pub mod output;

use std::collections::BTreeMap;

use rayon::prelude::*;
use thiserror::Error;
use verse_align::Aligner;
use verse_dataset::{assemble, Dataset, DatasetError};
use verse_labels::{build_spans, resolve, RuleSet, Signal};
use verse_protocol::{Book, BookId, Corpus, CorpusError, Example, Verse};

pub use config::{ConfigError, PipelineConfig};
pub use diagnostics::Diagnostics;
pub use output::{write_output, ExampleRecord, SpanRecord};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid corpus: {0}")]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// One verse after alignment, labeling and merging.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedVerse {
    pub example: Example,
    pub tokens: usize,
    pub unplaced: usize,
    pub flagged: bool,
    pub signals: BTreeMap<Signal, usize>,
}

pub fn process_verse(verse: &Verse, rules: &RuleSet, config: &PipelineConfig) -> ProcessedVerse {
    let alignment = Aligner::new(&config.align).align(verse);
    let labels = resolve(&alignment.tokens, rules);
    let spans = build_spans(&alignment, &labels, rules, &config.labels);

    let mut signals = BTreeMap::new();
    for label in labels.iter().flatten() {
        *signals.entry(label.signal).or_default() += 1;
    }

    ProcessedVerse {
        tokens: alignment.tokens.len(),
        unplaced: alignment.unplaced(),
        flagged: alignment.needs_audit(config.align.audit_threshold),
        signals,
        example: Example {
            reference: verse.reference,
            text: alignment.text.to_string(),
            spans,
        },
    }
}

pub struct PipelineOutput {
    pub dataset: Dataset,
    pub diagnostics: Diagnostics,
}

/// Runs the whole build. Verses are processed in parallel; results come back
/// in corpus order, so output depends only on the inputs and the seed.
pub fn run(corpus: &Corpus, rules: &RuleSet, config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    corpus.validate()?;
    config.validate()?;
    config.dataset.validate(&corpus.books)?;
    tracing::info!(
        version = corpus.version,
        books = corpus.books.len(),
        verses = corpus.verses.len(),
        "processing corpus"
    );

    let processed: Vec<ProcessedVerse> = corpus
        .verses
        .par_iter()
        .map(|verse| process_verse(verse, rules, config))
        .collect();

    let books: BTreeMap<BookId, &Book> = corpus.books.iter().map(|b| (b.id, b)).collect();
    let mut diagnostics = Diagnostics::default();
    let examples: Vec<Example> = processed
        .into_iter()
        .map(|verse| {
            diagnostics.record(&books, &verse);
            verse.example
        })
        .collect();

    if !diagnostics.flagged.is_empty() {
        tracing::warn!(
            flagged = diagnostics.flagged.len(),
            unplaced = diagnostics.unplaced,
            "verses exceed the unplaced-token threshold"
        );
    }

    let dataset = assemble(examples, &corpus.books, &config.dataset)?;
    diagnostics.record_dataset(&books, &dataset);

    Ok(PipelineOutput { dataset, diagnostics })
}
