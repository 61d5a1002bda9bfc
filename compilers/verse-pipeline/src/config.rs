use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use verse_align::AlignConfig;
use verse_dataset::DatasetConfig;
use verse_labels::SpanConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("audit threshold must lie in [0, 1], got {0}")]
    AuditThreshold(f64),
}

/// Everything a build needs besides the corpus and the rule set.
/// Every field may be omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub align: AlignConfig,
    pub labels: SpanConfig,
    pub dataset: DatasetConfig,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks what serde cannot. Split ratios and holdouts are checked by the
    /// assembler, which knows the book table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.align.audit_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::AuditThreshold(threshold));
        }
        Ok(())
    }
}
