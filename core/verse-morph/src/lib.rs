#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

use alloc::string::{String, ToString};

use verse_protocol::{MorphFlags, PartOfSpeech};

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MorphError {
    Empty,
    UnknownPartOfSpeech(String),
    InvalidSegment { code: String, segment: String },
}

impl fmt::Display for MorphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MorphError::Empty => write!(f, "Empty morphology code"),
            MorphError::UnknownPartOfSpeech(pos) => write!(f, "Unknown part of speech: '{}'", pos),
            MorphError::InvalidSegment { code, segment } => {
                write!(f, "Invalid segment '{}' in morphology code '{}'", segment, code)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MorphError {}

/// Parses a Robinson-style morphology code (`N-NSM`, `V-PAI-3S`,
/// `V-AAP-GPM`, `P-1NS`, `CONJ`) into flags.
///
/// Trailing segments the parser does not know (`-C`, `-ATT`, `-I`) are
/// ignored; an unknown leading segment is an error.
pub fn parse_code(code: &str) -> Result<MorphFlags, MorphError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(MorphError::Empty);
    }

    let mut segments = code.split('-');
    let head = segments.next().unwrap_or_default();
    let (mut flags, shape) = classify(head)?;
    let invalid = |segment: &str| MorphError::InvalidSegment {
        code: code.to_string(),
        segment: segment.to_string(),
    };

    match shape {
        Shape::Nominal { possessive } => {
            if let Some(segment) = segments.next() {
                flags |= nominal_segment(segment, possessive).ok_or_else(|| invalid(segment))?;
            }
        }
        Shape::Verbal => {
            let Some(segment) = segments.next() else {
                return Err(invalid(""));
            };
            let verbal = verbal_segment(segment).ok_or_else(|| invalid(segment))?;
            flags |= verbal;

            if let Some(segment) = segments.next() {
                let rest = if verbal.contains(MorphFlags::PARTICIPLE) {
                    nominal_segment(segment, false)
                } else {
                    person_number(segment)
                };
                flags |= rest.ok_or_else(|| invalid(segment))?;
            }
        }
        Shape::Invariant => {}
    }

    Ok(flags)
}

/// Part of speech of a code, `None` when the code is unparsable or
/// carries no part of speech (`HEB`, `ARAM`).
pub fn part_of_speech(code: &str) -> Option<PartOfSpeech> {
    parse_code(code).ok().and_then(PartOfSpeech::from_flags)
}

enum Shape {
    Nominal { possessive: bool },
    Verbal,
    Invariant,
}

fn classify(head: &str) -> Result<(MorphFlags, Shape), MorphError> {
    let nominal = Shape::Nominal { possessive: false };
    let res = match head.to_ascii_uppercase().as_str() {
        "N" => (MorphFlags::NOUN, nominal),
        "A" => (MorphFlags::ADJECTIVE, nominal),
        "T" => (MorphFlags::ARTICLE, nominal),
        "R" => (MorphFlags::PRONOUN | MorphFlags::RELATIVE, nominal),
        "S" => (MorphFlags::PRONOUN, Shape::Nominal { possessive: true }),
        "P" | "C" | "D" | "F" | "I" | "K" | "Q" | "X" => (MorphFlags::PRONOUN, nominal),
        "V" => (MorphFlags::VERB, Shape::Verbal),
        "ADV" => (MorphFlags::ADVERB, Shape::Invariant),
        "CONJ" | "COND" => (MorphFlags::CONJUNCTION, Shape::Invariant),
        "PREP" => (MorphFlags::PREPOSITION, Shape::Invariant),
        "PRT" => (MorphFlags::PARTICLE, Shape::Invariant),
        "INJ" => (MorphFlags::INTERJECTION, Shape::Invariant),
        "HEB" | "ARAM" => (MorphFlags::INDECLINABLE, Shape::Invariant),
        _ => return Err(MorphError::UnknownPartOfSpeech(head.to_string())),
    };
    Ok(res)
}

/// `NSM`, `1NS`, `1SNS` (possessive), `PRI`, `NUI`.
fn nominal_segment(segment: &str, possessive: bool) -> Option<MorphFlags> {
    match segment {
        "PRI" => return Some(MorphFlags::PROPER | MorphFlags::INDECLINABLE),
        "NUI" => return Some(MorphFlags::NUMERAL | MorphFlags::INDECLINABLE),
        "LI" | "OI" => return Some(MorphFlags::INDECLINABLE),
        _ => {}
    }

    let mut chars = segment.chars().peekable();
    let mut flags = MorphFlags::empty();

    if let Some(person) = chars.peek().and_then(|c| person(*c)) {
        flags |= person;
        chars.next();
        // Possessives carry the possessor's number before the case.
        if possessive {
            number(chars.next()?)?;
        }
    }

    flags |= case(chars.next()?)?;
    flags |= number(chars.next()?)?;
    if let Some(c) = chars.next() {
        flags |= gender(c)?;
    }
    if chars.next().is_some() {
        return None;
    }
    Some(flags)
}

/// `PAI`, `2AAI`, `PXI`, `AAN`.
fn verbal_segment(segment: &str) -> Option<MorphFlags> {
    let body = segment.trim_start_matches(|c: char| c.is_ascii_digit());
    let mut chars = body.chars();
    let mut flags = tense(chars.next()?)?;
    flags |= voice(chars.next()?)?;
    flags |= mood(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }
    Some(flags)
}

/// `3S`, `1P`.
fn person_number(segment: &str) -> Option<MorphFlags> {
    let mut chars = segment.chars();
    let flags = person(chars.next()?)? | number(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }
    Some(flags)
}

fn person(c: char) -> Option<MorphFlags> {
    match c {
        '1' => Some(MorphFlags::FIRST_PERSON),
        '2' => Some(MorphFlags::SECOND_PERSON),
        '3' => Some(MorphFlags::THIRD_PERSON),
        _ => None,
    }
}

fn case(c: char) -> Option<MorphFlags> {
    match c {
        'N' => Some(MorphFlags::NOMINATIVE),
        'G' => Some(MorphFlags::GENITIVE),
        'D' => Some(MorphFlags::DATIVE),
        'A' => Some(MorphFlags::ACCUSATIVE),
        'V' => Some(MorphFlags::VOCATIVE),
        _ => None,
    }
}

fn number(c: char) -> Option<MorphFlags> {
    match c {
        'S' => Some(MorphFlags::SINGULAR),
        'P' => Some(MorphFlags::PLURAL),
        _ => None,
    }
}

fn gender(c: char) -> Option<MorphFlags> {
    match c {
        'M' => Some(MorphFlags::MASCULINE),
        'F' => Some(MorphFlags::FEMININE),
        'N' => Some(MorphFlags::NEUTER),
        _ => None,
    }
}

fn tense(c: char) -> Option<MorphFlags> {
    match c {
        'P' => Some(MorphFlags::PRESENT),
        'I' => Some(MorphFlags::IMPERFECT),
        'F' => Some(MorphFlags::FUTURE),
        'A' => Some(MorphFlags::AORIST),
        'R' => Some(MorphFlags::PERFECT),
        'L' => Some(MorphFlags::PLUPERFECT),
        _ => None,
    }
}

fn voice(c: char) -> Option<MorphFlags> {
    match c {
        'A' => Some(MorphFlags::ACTIVE),
        'M' | 'D' => Some(MorphFlags::MIDDLE),
        'P' | 'O' => Some(MorphFlags::PASSIVE),
        'E' | 'N' => Some(MorphFlags::MIDDLE | MorphFlags::PASSIVE),
        // εἰμί and friends carry no voice
        'X' => Some(MorphFlags::empty()),
        _ => None,
    }
}

fn mood(c: char) -> Option<MorphFlags> {
    match c {
        'I' => Some(MorphFlags::INDICATIVE),
        'S' => Some(MorphFlags::SUBJUNCTIVE),
        'O' => Some(MorphFlags::OPTATIVE),
        'M' => Some(MorphFlags::IMPERATIVE),
        'N' => Some(MorphFlags::INFINITIVE),
        'P' => Some(MorphFlags::PARTICIPLE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use proptest::prelude::*;

    #[test]
    fn test_noun_code() {
        let flags = parse_code("N-NSM").unwrap();
        assert_eq!(
            flags,
            MorphFlags::NOUN | MorphFlags::NOMINATIVE | MorphFlags::SINGULAR | MorphFlags::MASCULINE
        );
        assert_eq!(part_of_speech("N-NSM"), Some(PartOfSpeech::Noun));
    }

    #[test]
    fn test_finite_verb() {
        let flags = parse_code("V-2AAI-3S").unwrap();
        assert!(flags.contains(MorphFlags::VERB | MorphFlags::AORIST | MorphFlags::ACTIVE));
        assert!(flags.contains(MorphFlags::INDICATIVE | MorphFlags::THIRD_PERSON | MorphFlags::SINGULAR));
    }

    #[test]
    fn test_participle_takes_case() {
        let flags = parse_code("V-PAP-GPM").unwrap();
        assert!(flags.contains(MorphFlags::PARTICIPLE | MorphFlags::GENITIVE | MorphFlags::PLURAL));
        assert!(!flags.intersects(MorphFlags::FIRST_PERSON | MorphFlags::SECOND_PERSON | MorphFlags::THIRD_PERSON));
    }

    #[test]
    fn test_infinitive_without_third_segment() {
        let flags = parse_code("V-PAN").unwrap();
        assert!(flags.contains(MorphFlags::INFINITIVE));
    }

    #[test]
    fn test_pronouns() {
        let personal = parse_code("P-1NS").unwrap();
        assert!(personal.contains(MorphFlags::PRONOUN | MorphFlags::FIRST_PERSON | MorphFlags::NOMINATIVE));

        let relative = parse_code("R-NSM").unwrap();
        assert!(relative.contains(MorphFlags::RELATIVE));

        let possessive = parse_code("S-1SNSF").unwrap();
        assert!(possessive.contains(MorphFlags::NOMINATIVE | MorphFlags::FEMININE));

        // Gender is optional after the possessor's number
        let genderless = parse_code("S-1SNS").unwrap();
        assert!(genderless.contains(MorphFlags::FIRST_PERSON | MorphFlags::NOMINATIVE | MorphFlags::SINGULAR));
        assert!(parse_code("S-1XNS").is_err());
    }

    #[test]
    fn test_indeclinables_and_invariants() {
        let proper = parse_code("N-PRI").unwrap();
        assert!(proper.contains(MorphFlags::NOUN | MorphFlags::PROPER | MorphFlags::INDECLINABLE));
        assert_eq!(part_of_speech("CONJ"), Some(PartOfSpeech::Conjunction));
        assert_eq!(part_of_speech("PRT-N"), Some(PartOfSpeech::Particle));
        assert_eq!(part_of_speech("HEB"), None);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_code("  "), Err(MorphError::Empty));
        assert_eq!(parse_code("ZZ-NSM"), Err(MorphError::UnknownPartOfSpeech("ZZ".into())));
        assert!(matches!(parse_code("N-QQQ"), Err(MorphError::InvalidSegment { .. })));
        assert!(matches!(parse_code("V"), Err(MorphError::InvalidSegment { .. })));
    }

    proptest! {
        #[test]
        fn test_parse_never_panics(code in "\\PC{0,12}") {
            let _ = parse_code(&code);
        }

        #[test]
        fn test_nominal_has_one_case(
            pos in "[NAT]",
            case in "[NGDAV]",
            number in "[SP]",
            gender in "[MFN]",
        ) {
            let flags = parse_code(&format!("{}-{}{}{}", pos, case, number, gender)).unwrap();
            prop_assert_eq!((flags & MorphFlags::CASES).bits().count_ones(), 1);
        }
    }
}
