use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use verse_protocol::{PartOfSpeech, Token};

use crate::gazetteer::{self, GazetteerIndex, Phrase};
use crate::resolver::{ordered_predicates, Predicate};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read rule set {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse rule set {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("category '{category}' references gazetteer {} which cannot be read: {source}", .path.display())]
    MissingGazetteer {
        category: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("category #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("category '{name}' is declared more than once")]
    DuplicateCategory { name: String },
    #[error("category '{name}' declares conflicting priorities {first} and {second}")]
    ConflictingPriority { name: String, first: u32, second: u32 },
    #[error("rule set enables no categories")]
    NoCategories,
}

/// On-disk form of a rule set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSetConfig {
    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    /// Higher wins.
    pub priority: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub root_ids: Vec<String>,
    #[serde(default)]
    pub root_forms: Vec<String>,
    #[serde(default)]
    pub surface_forms: Vec<String>,
    /// Applies to surface forms and gazetteer phrases.
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    /// Phrase files, relative to the rule set file.
    #[serde(default)]
    pub gazetteers: Vec<PathBuf>,
    #[serde(default)]
    pub phrases: Vec<String>,
    /// Restricts the single-token signals to these parts of speech.
    #[serde(default)]
    pub parts_of_speech: Vec<PartOfSpeech>,
}

fn default_true() -> bool {
    true
}

impl CategoryConfig {
    pub fn new(name: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            priority,
            enabled: true,
            root_ids: Vec::new(),
            root_forms: Vec::new(),
            surface_forms: Vec::new(),
            case_sensitive: true,
            gazetteers: Vec::new(),
            phrases: Vec::new(),
            parts_of_speech: Vec::new(),
        }
    }

    pub fn with_root_ids(mut self, ids: &[&str]) -> Self {
        self.root_ids.extend(ids.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_root_forms(mut self, forms: &[&str]) -> Self {
        self.root_forms.extend(forms.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_surface_forms(mut self, forms: &[&str]) -> Self {
        self.surface_forms.extend(forms.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_phrases(mut self, phrases: &[&str]) -> Self {
        self.phrases.extend(phrases.iter().map(|s| s.to_string()));
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }
}

/// A compiled, enabled category.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub priority: u32,
    /// Position among enabled categories in declaration order.
    pub declared: usize,
    pub case_sensitive: bool,
    root_ids: HashSet<String>,
    root_forms: HashSet<String>,
    surface_forms: HashSet<String>,
    parts_of_speech: Vec<PartOfSpeech>,
}

impl Category {
    fn compile(config: &CategoryConfig, declared: usize) -> Self {
        let trimmed = |values: &[String]| -> HashSet<String> {
            values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        };
        let mut surface_forms = trimmed(&config.surface_forms);
        if !config.case_sensitive {
            surface_forms = surface_forms.into_iter().map(|s| s.to_lowercase()).collect();
        }

        Self {
            name: config.name.trim().to_string(),
            priority: config.priority,
            declared,
            case_sensitive: config.case_sensitive,
            root_ids: trimmed(&config.root_ids),
            root_forms: trimmed(&config.root_forms),
            surface_forms,
            parts_of_speech: config.parts_of_speech.clone(),
        }
    }

    pub fn has_root_ids(&self) -> bool {
        !self.root_ids.is_empty()
    }

    pub fn has_root_forms(&self) -> bool {
        !self.root_forms.is_empty()
    }

    pub fn has_surface_forms(&self) -> bool {
        !self.surface_forms.is_empty()
    }

    pub fn is_guarded(&self) -> bool {
        !self.parts_of_speech.is_empty()
    }

    pub fn matches_root_id(&self, token: &Token) -> bool {
        token.root_id.as_deref().is_some_and(|id| self.root_ids.contains(id.trim()))
    }

    pub fn matches_root_form(&self, token: &Token) -> bool {
        token.root_form.as_deref().is_some_and(|form| self.root_forms.contains(form.trim()))
    }

    /// `key` is the token text with surrounding punctuation stripped.
    pub fn matches_surface(&self, key: &str) -> bool {
        if self.case_sensitive {
            self.surface_forms.contains(key)
        } else {
            self.surface_forms.contains(&key.to_lowercase())
        }
    }

    /// Whether the part-of-speech guard lets a token with `pos` through.
    pub fn admits(&self, pos: Option<PartOfSpeech>) -> bool {
        self.parts_of_speech.is_empty() || pos.is_some_and(|p| self.parts_of_speech.contains(&p))
    }
}

/// Validated rule set: categories, their ordered predicates and the phrase index.
#[derive(Debug, Clone)]
pub struct RuleSet {
    categories: Vec<Category>,
    predicates: Vec<Predicate>,
    gazetteer: GazetteerIndex,
}

impl RuleSet {
    /// Loads a JSON rule set. Gazetteer paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let content = fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RuleSetConfig = serde_json::from_str(&content).map_err(|source| RuleError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_config(&config, base_dir)
    }

    pub fn from_config(config: &RuleSetConfig, base_dir: &Path) -> Result<Self, RuleError> {
        let mut priorities: HashMap<&str, u32> = HashMap::new();
        for (index, category) in config.categories.iter().enumerate() {
            let name = category.name.trim();
            if name.is_empty() {
                return Err(RuleError::EmptyName { index });
            }
            if let Some(&first) = priorities.get(name) {
                if first != category.priority {
                    return Err(RuleError::ConflictingPriority {
                        name: name.to_string(),
                        first,
                        second: category.priority,
                    });
                }
                return Err(RuleError::DuplicateCategory { name: name.to_string() });
            }
            priorities.insert(name, category.priority);
        }

        let mut categories = Vec::new();
        let mut phrases = Vec::new();
        for entry in config.categories.iter().filter(|c| c.enabled) {
            let index = categories.len();
            let category = Category::compile(entry, index);

            let mut lists: Vec<Vec<String>> = entry.phrases.iter().filter_map(|p| gazetteer::parse_phrase(p)).collect();
            for file in &entry.gazetteers {
                let path = base_dir.join(file);
                let loaded = gazetteer::read_gazetteer(&path).map_err(|source| RuleError::MissingGazetteer {
                    category: category.name.clone(),
                    path: path.clone(),
                    source,
                })?;
                if loaded.is_empty() {
                    tracing::warn!(category = %category.name, path = %path.display(), "gazetteer has no phrases");
                }
                lists.extend(loaded);
            }

            phrases.extend(
                lists
                    .into_iter()
                    .map(|words| Phrase::new(words, index, category.priority, index, category.case_sensitive)),
            );
            categories.push(category);
        }

        if categories.is_empty() {
            return Err(RuleError::NoCategories);
        }

        let gazetteer = GazetteerIndex::build(phrases);
        let predicates = ordered_predicates(&categories);
        tracing::info!(
            categories = categories.len(),
            predicates = predicates.len(),
            phrases = gazetteer.len(),
            "rule set loaded"
        );

        Ok(Self {
            categories,
            predicates,
            gazetteer,
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, index: usize) -> &Category {
        &self.categories[index]
    }

    pub fn name(&self, index: usize) -> &str {
        &self.categories[index].name
    }

    /// Single-token predicates in evaluation order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn gazetteer(&self) -> &GazetteerIndex {
        &self.gazetteer
    }

    /// True when some category needs morphology parsed to decide.
    pub fn needs_morphology(&self) -> bool {
        self.categories.iter().any(Category::is_guarded)
    }
}
