use serde::{Deserialize, Serialize};
use verse_align::text::is_punctuation;
use verse_align::VerseAlignment;
use verse_protocol::{CharRange, Span};

use crate::resolver::Label;
use crate::rules::RuleSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanConfig {
    /// Strip punctuation and whitespace from span edges.
    pub trim_punctuation: bool,
}

impl Default for SpanConfig {
    fn default() -> Self {
        Self { trim_punctuation: true }
    }
}

/// Coalesces adjacent same-category tokens into spans.
///
/// Two labeled tokens merge when they share a category and only whitespace
/// separates them. Unlabeled and unplaced tokens close the open span. The
/// result is sorted by start and non-overlapping because alignment ranges
/// never move backwards.
pub fn build_spans(
    alignment: &VerseAlignment,
    labels: &[Option<Label>],
    rules: &RuleSet,
    config: &SpanConfig,
) -> Vec<Span> {
    let chars = &alignment.chars;
    let mut spans = Vec::new();
    let mut open: Option<(usize, CharRange)> = None;

    let mut close = |open: &mut Option<(usize, CharRange)>| {
        if let Some((category, range)) = open.take() {
            let range = if config.trim_punctuation { trim(chars, range) } else { range };
            spans.push(Span {
                reference: alignment.reference,
                range,
                label: rules.name(category).to_string(),
            });
        }
    };

    for (token, label) in alignment.tokens.iter().zip(labels) {
        let (Some(range), Some(label)) = (token.range, label) else {
            close(&mut open);
            continue;
        };

        match open.as_mut() {
            Some((category, current)) if *category == label.category && blank_between(chars, current.end, range.start) => {
                current.end = range.end;
            }
            _ => {
                close(&mut open);
                open = Some((label.category, range));
            }
        }
    }
    close(&mut open);

    spans
}

fn blank_between(chars: &[char], from: usize, to: usize) -> bool {
    from <= to && chars[from..to].iter().all(|c| c.is_whitespace())
}

/// Shrinks `range` past edge punctuation; keeps it as is when nothing would remain.
fn trim(chars: &[char], range: CharRange) -> CharRange {
    let noise = |c: char| c.is_whitespace() || is_punctuation(c);
    let mut start = range.start;
    let mut end = range.end;
    while start < end && noise(chars[start]) {
        start += 1;
    }
    while end > start && noise(chars[end - 1]) {
        end -= 1;
    }
    if start == end {
        range
    } else {
        CharRange::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;
    use crate::rules::{CategoryConfig, RuleSetConfig};
    use proptest::prelude::*;
    use std::path::Path;
    use verse_align::{AlignConfig, Aligner};
    use verse_protocol::{BookId, Token, Verse, VerseRef};

    fn rules(categories: Vec<CategoryConfig>) -> RuleSet {
        RuleSet::from_config(&RuleSetConfig { categories }, Path::new(".")).unwrap()
    }

    fn bare(text: &str) -> Verse {
        Verse {
            reference: VerseRef::new(BookId(1), 1, 1),
            raw_text: text.to_string(),
            clean_text: text.to_string(),
            tokens: text.split_whitespace().map(Token::bare).collect(),
        }
    }

    fn spans_for(v: &Verse, rules: &RuleSet, config: &SpanConfig) -> Vec<(usize, usize, String)> {
        let align = AlignConfig::default();
        let alignment = Aligner::new(&align).align(v);
        let labels = resolve(&alignment.tokens, rules);
        build_spans(&alignment, &labels, rules, config)
            .into_iter()
            .map(|s| (s.range.start, s.range.end, s.label))
            .collect()
    }

    #[test]
    fn test_single_deity_span() {
        let rules = rules(vec![CategoryConfig::new("DEITY", 1).with_surface_forms(&["God"])]);
        let spans = spans_for(&bare("In the beginning God created"), &rules, &SpanConfig::default());
        assert_eq!(spans, vec![(17, 20, "DEITY".to_string())]);

        let spans = spans_for(&bare("In the beginning the heavens"), &rules, &SpanConfig::default());
        assert!(spans.is_empty());
    }

    #[test]
    fn test_adjacent_tokens_merge() {
        let rules = rules(vec![CategoryConfig::new("DEITY", 1).with_surface_forms(&["Holy", "Spirit"])]);
        let spans = spans_for(&bare("the Holy  Spirit descended"), &rules, &SpanConfig::default());
        assert_eq!(spans, vec![(4, 16, "DEITY".to_string())]);
    }

    #[test]
    fn test_gaps_break_merging() {
        let rules = rules(vec![
            CategoryConfig::new("DEITY", 1).with_surface_forms(&["God", "Lord"]),
            CategoryConfig::new("PERSON", 1).with_surface_forms(&["Moses"]),
        ]);
        // Punctuation between, an unlabeled token between, a different category next
        let mut v = bare("Lord, God and God Moses");
        v.tokens = ["Lord", "God", "and", "God", "Moses"].into_iter().map(Token::bare).collect();
        let spans = spans_for(&v, &rules, &SpanConfig::default());
        assert_eq!(
            spans,
            vec![
                (0, 4, "DEITY".to_string()),
                (6, 9, "DEITY".to_string()),
                (14, 17, "DEITY".to_string()),
                (18, 23, "PERSON".to_string()),
            ]
        );
    }

    #[test]
    fn test_trimming_edge_punctuation() {
        let rules = rules(vec![CategoryConfig::new("DEITY", 1).with_surface_forms(&["God"])]);
        let v = bare("\u{201C}God,\u{201D} he said");
        let trimmed = spans_for(&v, &rules, &SpanConfig::default());
        assert_eq!(trimmed, vec![(1, 4, "DEITY".to_string())]);

        let raw = spans_for(&v, &rules, &SpanConfig { trim_punctuation: false });
        assert_eq!(raw, vec![(0, 6, "DEITY".to_string())]);
    }

    proptest! {
        #[test]
        fn test_spans_sorted_disjoint_in_bounds(words in proptest::collection::vec("(God|Lord|and|the|,)", 0..20)) {
            let rules = rules(vec![
                CategoryConfig::new("DEITY", 1).with_surface_forms(&["God", "Lord"]),
                CategoryConfig::new("FUNC", 1).with_surface_forms(&["the"]),
            ]);
            let text = words.join(" ");
            let v = bare(&text);
            let spans = spans_for(&v, &rules, &SpanConfig::default());
            let len = text.chars().count();

            let mut last_end = 0;
            for (start, end, _) in spans {
                prop_assert!(start >= last_end);
                prop_assert!(start < end && end <= len);
                last_end = end;
            }
        }
    }
}
