use serde::{Deserialize, Serialize};
use verse_protocol::CharRange;

use crate::text::{is_punctuation, same_caseless};

/// Which relaxation placed a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    CaseInsensitive,
    PunctuationStripped,
}

/// Searches `needle` in `text` with start offsets limited to
/// `from ..= from + lookahead`.
///
/// The nearest start wins. At each start the strategies run in order of
/// strictness, so a relaxed match at the cursor beats an exact one further on.
pub fn find(text: &[char], from: usize, lookahead: usize, needle: &[char]) -> Option<(CharRange, MatchMethod)> {
    if needle.is_empty() || from >= text.len() {
        return None;
    }
    let last = from.saturating_add(lookahead).min(text.len() - 1);
    let core: Vec<char> = needle.iter().copied().filter(|c| !is_punctuation(*c)).collect();

    (from..=last).find_map(|i| {
        exact(text, i, needle)
            .map(|r| (r, MatchMethod::Exact))
            .or_else(|| caseless(text, i, needle).map(|r| (r, MatchMethod::CaseInsensitive)))
            .or_else(|| stripped(text, i, &core).map(|r| (r, MatchMethod::PunctuationStripped)))
    })
}

fn window<'t>(text: &'t [char], start: usize, len: usize) -> Option<&'t [char]> {
    text.get(start..start.checked_add(len)?)
}

fn exact(text: &[char], start: usize, needle: &[char]) -> Option<CharRange> {
    (window(text, start, needle.len())? == needle).then(|| CharRange::new(start, start + needle.len()))
}

fn caseless(text: &[char], start: usize, needle: &[char]) -> Option<CharRange> {
    window(text, start, needle.len())?
        .iter()
        .zip(needle)
        .all(|(&a, &b)| same_caseless(a, b))
        .then(|| CharRange::new(start, start + needle.len()))
}

/// `core` is the needle with its punctuation removed.
fn stripped(text: &[char], start: usize, core: &[char]) -> Option<CharRange> {
    if core.is_empty() || is_punctuation(text[start]) || text[start].is_whitespace() {
        return None;
    }
    match_skipping_punctuation(text, start, core).map(|end| CharRange::new(start, end))
}

/// Matches `core` from `start`, stepping over punctuation in the text.
/// Returns the end offset after the last matched char.
fn match_skipping_punctuation(text: &[char], start: usize, core: &[char]) -> Option<usize> {
    let mut j = start;
    for &wanted in core {
        loop {
            let found = *text.get(j)?;
            j += 1;
            if same_caseless(found, wanted) {
                break;
            }
            if !is_punctuation(found) {
                return None;
            }
        }
    }
    Some(j)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_exact_is_leftmost() {
        let text = chars("the cat and the dog");
        let (range, method) = find(&text, 0, 100, &chars("the")).unwrap();
        assert_eq!(range, CharRange::new(0, 3));
        assert_eq!(method, MatchMethod::Exact);

        let (range, _) = find(&text, 1, 100, &chars("the")).unwrap();
        assert_eq!(range, CharRange::new(12, 15));
    }

    #[test]
    fn test_nearest_start_beats_stricter_strategy() {
        let text = chars("LORD said to the Lord");
        let (range, method) = find(&text, 0, 100, &chars("Lord")).unwrap();
        assert_eq!(range, CharRange::new(0, 4));
        assert_eq!(method, MatchMethod::CaseInsensitive);

        // Exact still wins when both strategies match at the same start
        let (range, method) = find(&text, 1, 100, &chars("Lord")).unwrap();
        assert_eq!(range, CharRange::new(17, 21));
        assert_eq!(method, MatchMethod::Exact);
    }

    #[test]
    fn test_caseless_fallback() {
        let text = chars("And GOD said");
        let (range, method) = find(&text, 0, 100, &chars("God")).unwrap();
        assert_eq!(range, CharRange::new(4, 7));
        assert_eq!(method, MatchMethod::CaseInsensitive);
    }

    #[test]
    fn test_punctuation_stripped() {
        // Token carries a comma the text dropped, text carries an apostrophe the token dropped
        let text = chars("the LORD's house");
        let (range, method) = find(&text, 0, 100, &chars("LORDs,")).unwrap();
        assert_eq!(range, CharRange::new(4, 10));
        assert_eq!(method, MatchMethod::PunctuationStripped);
    }

    #[test]
    fn test_lookahead_bounds_start() {
        let text = chars("aaaaaaaaaa target");
        assert!(find(&text, 0, 5, &chars("target")).is_none());
        assert!(find(&text, 0, 11, &chars("target")).is_some());
    }

    #[test]
    fn test_pure_punctuation_needs_literal_match() {
        let text = chars("a b");
        assert!(find(&text, 0, 10, &chars(",")).is_none());
        assert!(find(&text, 0, 10, &[]).is_none());
    }
}
