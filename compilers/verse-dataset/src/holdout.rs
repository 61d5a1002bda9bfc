use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use verse_protocol::{Book, VerseRef};

use crate::selector::ResolvedSelector;
use crate::{DatasetError, DEV, TEST, TRAIN};

/// A named partition carved out of the corpus before the split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldoutConfig {
    pub name: String,
    pub selectors: Vec<String>,
}

impl HoldoutConfig {
    pub fn new(name: impl Into<String>, selectors: &[&str]) -> Self {
        Self {
            name: name.into(),
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Holdout {
    pub name: String,
    selectors: Vec<ResolvedSelector>,
}

impl Holdout {
    pub fn claims(&self, reference: &VerseRef) -> bool {
        self.selectors.iter().any(|s| s.matches(reference))
    }

    /// True when the claim on this verse comes from a whole-book selector.
    pub fn claims_whole_book(&self, reference: &VerseRef) -> bool {
        self.selectors
            .iter()
            .any(|s| s.is_whole_book() && s.book == reference.book)
    }
}

pub(crate) fn compile(configs: &[HoldoutConfig], books: &[Book]) -> Result<Vec<Holdout>, DatasetError> {
    let mut seen = HashSet::new();
    configs
        .iter()
        .map(|config| {
            let name = config.name.trim();
            if name.is_empty() {
                return Err(DatasetError::EmptyHoldoutName);
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
                return Err(DatasetError::InvalidHoldoutName(name.to_string()));
            }
            if [TRAIN, DEV, TEST].contains(&name) {
                return Err(DatasetError::ReservedName(name.to_string()));
            }
            if !seen.insert(name.to_string()) {
                return Err(DatasetError::DuplicateHoldout(name.to_string()));
            }
            let selectors = config
                .selectors
                .iter()
                .map(|s| ResolvedSelector::resolve(s, books))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Holdout {
                name: name.to_string(),
                selectors,
            })
        })
        .collect()
}
