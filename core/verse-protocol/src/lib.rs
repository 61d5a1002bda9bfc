#![no_std] // Shared by the pipeline crates and the snapshot tooling

extern crate alloc;

// Enable std if the feature is active (for error impls in tools/pipeline)
#[cfg(any(feature = "std", test))]
extern crate std;

pub mod ids;
pub mod morphology;

// Re-export core types for convenience
pub use ids::{BookId, VerseRef};
pub use morphology::*;

pub mod model;
pub use model::*;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use rkyv::{from_bytes, to_bytes};

    fn sample_corpus() -> Corpus {
        Corpus {
            version: 1,
            books: vec![
                Book { id: BookId(1), code: "GEN".to_string(), name: "Genesis".to_string() },
                Book { id: BookId(43), code: "JHN".to_string(), name: "John".to_string() },
            ],
            verses: vec![Verse {
                reference: VerseRef::new(BookId(1), 1, 1),
                raw_text: "<p>In the beginning God created</p>".to_string(),
                clean_text: "In the beginning God created".to_string(),
                tokens: vec![
                    Token::bare("In"),
                    Token {
                        text: "God".to_string(),
                        root_id: Some("H430".to_string()),
                        morph: Some("N-NSM".to_string()),
                        root_form: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_corpus_snapshot_roundtrip() {
        // Simulate compiling a snapshot and loading it back from disk
        let original = sample_corpus();
        let bytes = to_bytes::<_, 1024>(&original).expect("Failed to serialize Corpus");
        let restored: Corpus = from_bytes(&bytes).expect("Failed to deserialize Corpus");

        assert_eq!(original, restored);
        assert_eq!(restored.verses[0].tokens[0].root_id, None);
    }

    #[test]
    fn test_verse_ref_ordering() {
        let a = VerseRef::new(BookId(1), 2, 1);
        let b = VerseRef::new(BookId(1), 10, 1);
        let c = VerseRef::new(BookId(2), 1, 1);
        assert!(a < b && b < c);
        assert_eq!(a.to_string(), "1.2:1");
    }

    #[test]
    fn test_id_layout() {
        // BookId(u32) should stay exactly 4 bytes
        assert_eq!(core::mem::size_of::<BookId>(), 4);
    }

    #[test]
    fn test_validate_rejects_unknown_book() {
        let mut corpus = sample_corpus();
        assert_eq!(corpus.validate(), Ok(()));

        corpus.verses[0].reference.book = BookId(99);
        assert_eq!(
            corpus.validate(),
            Err(CorpusError::UnknownBook(VerseRef::new(BookId(99), 1, 1)))
        );
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut corpus = sample_corpus();
        let again = corpus.verses[0].clone();
        corpus.verses.push(again);
        assert!(matches!(corpus.validate(), Err(CorpusError::DuplicateVerse(_))));

        let mut corpus = sample_corpus();
        corpus.books[1].code = "GEN".to_string();
        assert_eq!(corpus.validate(), Err(CorpusError::DuplicateBookCode("GEN".to_string())));

        let mut corpus = sample_corpus();
        corpus.books[1].code = "gen".to_string();
        assert_eq!(corpus.validate(), Err(CorpusError::DuplicateBookCode("gen".to_string())));
    }

    #[test]
    fn test_part_of_speech_from_flags() {
        let flags = MorphFlags::NOUN | MorphFlags::NOMINATIVE | MorphFlags::SINGULAR;
        assert_eq!(flags.part_of_speech(), Some(PartOfSpeech::Noun));
        assert_eq!(MorphFlags::NOMINATIVE.part_of_speech(), None);
        assert!(MorphFlags::CASES.contains(MorphFlags::DATIVE));
    }
}
