use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use rkyv::{AlignedVec, Deserialize};
use verse_protocol::Corpus;

const SNAPSHOT_EXTENSION: &str = "rkyv";

/// Loads a corpus from JSON, or from an rkyv snapshot when the extension is `.rkyv`.
pub fn load(path: &Path) -> anyhow::Result<Corpus> {
    let is_snapshot = path.extension().and_then(|e| e.to_str()) == Some(SNAPSHOT_EXTENSION);
    let corpus = if is_snapshot {
        let bytes = fs::read(path).with_context(|| format!("reading snapshot {}", path.display()))?;
        from_snapshot(&bytes).with_context(|| format!("loading snapshot {}", path.display()))?
    } else {
        let content = fs::read_to_string(path).with_context(|| format!("reading corpus {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing corpus {}", path.display()))?
    };
    corpus.validate().map_err(|e| anyhow!("invalid corpus {}: {e}", path.display()))?;
    Ok(corpus)
}

pub fn to_snapshot(corpus: &Corpus) -> anyhow::Result<Vec<u8>> {
    let mut serializer = AllocSerializer::<256>::default();
    serializer
        .serialize_value(corpus)
        .map_err(|e| anyhow!("failed to serialize corpus: {e:?}"))?;
    Ok(serializer.into_serializer().into_inner().to_vec())
}

pub fn from_snapshot(bytes: &[u8]) -> anyhow::Result<Corpus> {
    // Archived data must be aligned before it is validated in place
    let mut aligned = AlignedVec::with_capacity(bytes.len());
    aligned.extend_from_slice(bytes);
    let archived = rkyv::check_archived_root::<Corpus>(&aligned).map_err(|e| anyhow!("corrupt snapshot: {e:?}"))?;
    archived
        .deserialize(&mut rkyv::Infallible)
        .map_err(|e| anyhow!("failed to deserialize snapshot: {e:?}"))
}
