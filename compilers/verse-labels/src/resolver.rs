use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use verse_align::text::word_key;
use verse_align::AlignedToken;
use verse_protocol::PartOfSpeech;

use crate::rules::{Category, RuleSet};

/// Evidence a label was assigned on. Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Gazetteer,
    RootId,
    RootForm,
    Surface,
}

/// One single-token rule: "category fires on signal", with its rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
    pub category: usize,
    pub priority: u32,
    pub declared: usize,
    pub signal: Signal,
}

impl Predicate {
    /// Sort key: priority (high first), declaration order, signal order.
    pub fn rank(&self) -> (Reverse<u32>, usize, Signal) {
        (Reverse(self.priority), self.declared, self.signal)
    }

    pub fn fires(&self, category: &Category, token: &AlignedToken, pos: Option<PartOfSpeech>) -> bool {
        if !category.admits(pos) {
            return false;
        }
        match self.signal {
            Signal::Gazetteer => false,
            Signal::RootId => category.matches_root_id(token.token),
            Signal::RootForm => category.matches_root_form(token.token),
            Signal::Surface => category.matches_surface(word_key(&token.token.text)),
        }
    }
}

/// Builds the single-token predicate list, one record per signal a category
/// actually declares, in evaluation order.
pub fn ordered_predicates(categories: &[Category]) -> Vec<Predicate> {
    let mut predicates: Vec<Predicate> = categories
        .iter()
        .enumerate()
        .flat_map(|(index, c)| {
            [
                (Signal::RootId, c.has_root_ids()),
                (Signal::RootForm, c.has_root_forms()),
                (Signal::Surface, c.has_surface_forms()),
            ]
            .into_iter()
            .filter(|(_, declared)| *declared)
            .map(move |(signal, _)| Predicate {
                category: index,
                priority: c.priority,
                declared: c.declared,
                signal,
            })
        })
        .collect();
    predicates.sort_by_key(Predicate::rank);
    predicates
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    pub category: usize,
    pub signal: Signal,
}

/// Assigns at most one category per token.
///
/// Phrases are tried first at every placed token and claim all the tokens
/// they cover; remaining tokens go through the ordered predicate list.
/// Unplaced tokens stay unlabeled.
pub fn resolve(tokens: &[AlignedToken], rules: &RuleSet) -> Vec<Option<Label>> {
    let mut labels = vec![None; tokens.len()];
    let needs_morphology = rules.needs_morphology();

    let mut i = 0;
    while i < tokens.len() {
        if !tokens[i].is_placed() {
            i += 1;
            continue;
        }

        if let Some(hit) = rules.gazetteer().longest_match(tokens, i) {
            let label = Label {
                category: hit.category,
                signal: Signal::Gazetteer,
            };
            labels[i..i + hit.len].fill(Some(label));
            i += hit.len;
            continue;
        }

        let pos = if needs_morphology {
            tokens[i].token.morph.as_deref().and_then(verse_morph::part_of_speech)
        } else {
            None
        };
        labels[i] = rules
            .predicates()
            .iter()
            .find(|p| p.fires(rules.category(p.category), &tokens[i], pos))
            .map(|p| Label {
                category: p.category,
                signal: p.signal,
            });
        i += 1;
    }

    labels
}
