use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use verse_protocol::{Book, BookId, Example};

use crate::diagnostics::display_ref;
use crate::PipelineOutput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

/// One JSONL line. Offsets count chars of `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRecord {
    #[serde(rename = "ref")]
    pub reference: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub spans: Vec<SpanRecord>,
}

impl ExampleRecord {
    pub fn new(books: &BTreeMap<BookId, &Book>, example: &Example) -> Self {
        let r = example.reference;
        Self {
            reference: display_ref(books, &r),
            book: books.get(&r.book).map_or_else(|| r.book.to_string(), |b| b.code.clone()),
            chapter: r.chapter,
            verse: r.verse,
            text: example.text.clone(),
            spans: example
                .spans
                .iter()
                .map(|s| SpanRecord {
                    start: s.range.start,
                    end: s.range.end,
                    label: s.label.clone(),
                })
                .collect(),
        }
    }
}

/// Writes `<partition>.jsonl` for every partition plus `diagnostics.json`.
/// Returns the files written.
pub fn write_output(out_dir: &Path, books: &[Book], output: &PipelineOutput) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let books: BTreeMap<BookId, &Book> = books.iter().map(|b| (b.id, b)).collect();
    let mut written = Vec::new();

    for partition in &output.dataset.partitions {
        let path = out_dir.join(format!("{}.jsonl", partition.name));
        let mut writer = BufWriter::new(File::create(&path)?);
        for example in &partition.examples {
            serde_json::to_writer(&mut writer, &ExampleRecord::new(&books, example))?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        tracing::info!(partition = %partition.name, examples = partition.len(), path = %path.display(), "wrote partition");
        written.push(path);
    }

    let path = out_dir.join("diagnostics.json");
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, &output.diagnostics)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    written.push(path);

    Ok(written)
}
