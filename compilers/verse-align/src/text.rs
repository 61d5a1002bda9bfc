/// Punctuation as far as alignment and span trimming are concerned.
///
/// ASCII punctuation plus the marks that show up in Greek and Hebrew
/// editions (ano teleia, maqaf, sof pasuq, paseq) and typographic quotes
/// and dashes.
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{00A1}'
                | '\u{00AB}'
                | '\u{00B7}'
                | '\u{00BB}'
                | '\u{00BF}'
                | '\u{037E}'
                | '\u{0387}'
                | '\u{05BE}'
                | '\u{05C0}'
                | '\u{05C3}'
                | '\u{05C6}'
                | '\u{2010}'..='\u{2027}'
                | '\u{2030}'..='\u{205E}'
                | '\u{2E00}'..='\u{2E7F}'
                | '\u{3000}'..='\u{303F}'
        )
}

/// Token text with leading and trailing punctuation removed (`"God,"` -> `"God"`).
pub fn word_key(text: &str) -> &str {
    text.trim().trim_matches(is_punctuation)
}

/// Case-insensitive char comparison that tolerates multi-char lowercase
/// expansions.
pub fn same_caseless(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_key() {
        assert_eq!(word_key("God,"), "God");
        assert_eq!(word_key(" \u{201C}Light!\u{201D} "), "Light");
        assert_eq!(word_key("θεός·"), "θεός");
        assert_eq!(word_key("..."), "");
    }

    #[test]
    fn test_caseless() {
        assert!(same_caseless('Θ', 'θ'));
        assert!(same_caseless('a', 'A'));
        assert!(!same_caseless('a', 'b'));
    }
}
