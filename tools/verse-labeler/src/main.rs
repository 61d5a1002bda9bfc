mod corpus;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use verse_align::TextSource;
use verse_labels::RuleSet;
use verse_pipeline::{run, write_output, PipelineConfig};

#[derive(Parser)]
#[command(author, version, about = "Builds labeled span datasets from an aligned verse corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Align, label and split the corpus, writing one JSONL file per partition
    Build {
        /// Corpus as JSON or as an `.rkyv` snapshot
        #[arg(short, long, value_name = "FILE")]
        corpus: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        rules: PathBuf,

        /// Pipeline config; defaults apply when omitted
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[arg(short, long, value_name = "DIR")]
        out_dir: PathBuf,

        /// Overrides the split seed from the config
        #[arg(long)]
        seed: Option<u64>,

        /// Overrides the text variant tokens are aligned against
        #[arg(long, value_enum)]
        text_source: Option<TextSourceArg>,
    },
    /// Compile a JSON corpus into an rkyv snapshot
    Compile {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TextSourceArg {
    Raw,
    Cleaned,
}

impl From<TextSourceArg> for TextSource {
    fn from(arg: TextSourceArg) -> Self {
        match arg {
            TextSourceArg::Raw => TextSource::Raw,
            TextSourceArg::Cleaned => TextSource::Cleaned,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Build {
            corpus,
            rules,
            config,
            out_dir,
            seed,
            text_source,
        } => {
            let mut pipeline = match &config {
                Some(path) => PipelineConfig::load(path)?,
                None => PipelineConfig::default(),
            };
            if let Some(seed) = seed {
                pipeline.dataset.seed = seed;
            }
            if let Some(source) = text_source {
                pipeline.align.text_source = source.into();
            }

            let rules = RuleSet::load(&rules)?;
            let corpus = corpus::load(&corpus)?;
            let output = run(&corpus, &rules, &pipeline)?;
            let written = write_output(&out_dir, &corpus.books, &output)
                .with_context(|| format!("writing dataset to {}", out_dir.display()))?;

            tracing::info!(
                files = written.len(),
                verses = output.diagnostics.verses,
                unplaced_ratio = output.diagnostics.unplaced_ratio(),
                flagged = output.diagnostics.flagged.len(),
                "build complete"
            );
        }
        Command::Compile { input, output } => {
            let corpus = corpus::load(&input)?;
            tracing::info!(
                version = corpus.version,
                books = corpus.books.len(),
                verses = corpus.verses.len(),
                "compiling corpus snapshot"
            );
            let bytes = corpus::to_snapshot(&corpus)?;
            fs::write(&output, bytes).with_context(|| format!("writing snapshot {}", output.display()))?;
            tracing::info!(path = %output.display(), "snapshot written");
        }
    }
    Ok(())
}
