use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use verse_align::text::word_key;
use verse_align::AlignedToken;

/// One literal multi-word phrase bound to a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub words: Vec<String>,
    folded: Vec<String>,
    pub category: usize,
    pub priority: u32,
    pub declared: usize,
    pub case_sensitive: bool,
}

impl Phrase {
    pub fn new(words: Vec<String>, category: usize, priority: u32, declared: usize, case_sensitive: bool) -> Self {
        let folded = words.iter().map(|w| w.to_lowercase()).collect();
        Self {
            words,
            folded,
            category,
            priority,
            declared,
            case_sensitive,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn matches(&self, tokens: &[AlignedToken]) -> bool {
        tokens.len() == self.words.len()
            && tokens.iter().enumerate().all(|(i, t)| {
                if !t.is_placed() {
                    return false;
                }
                let key = word_key(&t.token.text);
                if self.case_sensitive {
                    key == self.words[i]
                } else {
                    key.to_lowercase() == self.folded[i]
                }
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseMatch {
    pub category: usize,
    pub len: usize,
}

/// Phrases bucketed by their lowercased first word.
///
/// Each bucket is sorted by token count (longest first), then priority
/// (highest first), then declaration order, so the first hit is the answer.
#[derive(Debug, Clone, Default)]
pub struct GazetteerIndex {
    buckets: HashMap<String, Vec<Phrase>>,
    len: usize,
}

impl GazetteerIndex {
    pub fn build(phrases: impl IntoIterator<Item = Phrase>) -> Self {
        let mut buckets: HashMap<String, Vec<Phrase>> = HashMap::new();
        for phrase in phrases {
            if let Some(first) = phrase.folded.first() {
                buckets.entry(first.clone()).or_default().push(phrase);
            }
        }

        let mut len = 0;
        for bucket in buckets.values_mut() {
            bucket.sort_by(|a, b| {
                b.len()
                    .cmp(&a.len())
                    .then(b.priority.cmp(&a.priority))
                    .then(a.declared.cmp(&b.declared))
                    .then(a.words.cmp(&b.words))
            });
            bucket.dedup_by(|a, b| a.category == b.category && a.words == b.words);
            len += bucket.len();
        }

        Self { buckets, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Longest phrase starting at `at`. Every covered token must be placed.
    pub fn longest_match(&self, tokens: &[AlignedToken], at: usize) -> Option<PhraseMatch> {
        let first = tokens.get(at)?;
        let bucket = self.buckets.get(&word_key(&first.token.text).to_lowercase())?;

        bucket
            .iter()
            .filter(|p| at + p.len() <= tokens.len())
            .find(|p| p.matches(&tokens[at..at + p.len()]))
            .map(|p| PhraseMatch {
                category: p.category,
                len: p.len(),
            })
    }
}

/// Splits one gazetteer line into words. Blank lines and `#` comments yield `None`.
pub fn parse_phrase(line: &str) -> Option<Vec<String>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let words: Vec<String> = line
        .split_whitespace()
        .map(word_key)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    (!words.is_empty()).then_some(words)
}

/// Reads a newline-delimited phrase list.
pub fn read_gazetteer(path: &Path) -> io::Result<Vec<Vec<String>>> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().filter_map(parse_phrase).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use verse_align::{AlignConfig, Aligner};
    use verse_protocol::{BookId, Token, Verse, VerseRef};

    fn verse(text: &str) -> Verse {
        Verse {
            reference: VerseRef::new(BookId(40), 8, 20),
            raw_text: text.to_string(),
            clean_text: text.to_string(),
            tokens: text.split_whitespace().map(Token::bare).collect(),
        }
    }

    fn words(s: &str) -> Vec<String> {
        parse_phrase(s).unwrap()
    }

    #[test]
    fn test_parse_phrase() {
        assert_eq!(parse_phrase("  Son of Man  "), Some(vec!["Son".into(), "of".into(), "Man".into()]));
        assert_eq!(parse_phrase("# comment"), None);
        assert_eq!(parse_phrase("   "), None);
        assert_eq!(parse_phrase("Lord, God"), Some(vec!["Lord".into(), "God".into()]));
    }

    #[test]
    fn test_longest_phrase_wins() {
        let index = GazetteerIndex::build(vec![
            Phrase::new(words("Son"), 0, 1, 0, true),
            Phrase::new(words("Son of Man"), 1, 1, 1, true),
            Phrase::new(words("Son of"), 2, 9, 2, true),
        ]);
        let v = verse("the Son of Man has nowhere");
        let config = AlignConfig::default();
        let alignment = Aligner::new(&config).align(&v);

        assert_eq!(index.longest_match(&alignment.tokens, 1), Some(PhraseMatch { category: 1, len: 3 }));
        assert_eq!(index.longest_match(&alignment.tokens, 0), None);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_case_sensitivity_per_phrase() {
        let index = GazetteerIndex::build(vec![Phrase::new(words("Holy Spirit"), 0, 1, 0, true)]);
        let config = AlignConfig::default();
        let lower = verse("the holy spirit");
        let alignment = Aligner::new(&config).align(&lower);
        assert_eq!(index.longest_match(&alignment.tokens, 1), None);

        let index = GazetteerIndex::build(vec![Phrase::new(words("Holy Spirit"), 0, 1, 0, false)]);
        assert_eq!(index.longest_match(&alignment.tokens, 1), Some(PhraseMatch { category: 0, len: 2 }));
    }

    #[test]
    fn test_unplaced_token_breaks_phrase() {
        let index = GazetteerIndex::build(vec![Phrase::new(words("Holy Spirit"), 0, 1, 0, true)]);
        let mut v = verse("the Holy Spirit");
        v.clean_text = "the Holy".to_string();
        let config = AlignConfig::default();
        let alignment = Aligner::new(&config).align(&v);

        assert!(!alignment.tokens[2].is_placed());
        assert_eq!(index.longest_match(&alignment.tokens, 1), None);
    }

    #[test]
    fn test_read_gazetteer_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deity.txt");
        fs::write(&path, "# titles\nHoly Spirit\n\nLord of hosts\n").unwrap();

        let phrases = read_gazetteer(&path).unwrap();
        assert_eq!(phrases.len(), 2);
        assert_eq!(phrases[1], vec!["Lord", "of", "hosts"]);
    }
}
