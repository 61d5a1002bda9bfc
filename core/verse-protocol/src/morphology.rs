#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum PartOfSpeech {
    Noun = 0,
    Adjective = 1,
    Verb = 2,
    Adverb = 3,
    Article = 4,
    Preposition = 5,
    Conjunction = 6,
    Pronoun = 7,
    Particle = 8,
    Interjection = 9,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 10] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Adjective,
        PartOfSpeech::Verb,
        PartOfSpeech::Adverb,
        PartOfSpeech::Article,
        PartOfSpeech::Preposition,
        PartOfSpeech::Conjunction,
        PartOfSpeech::Pronoun,
        PartOfSpeech::Particle,
        PartOfSpeech::Interjection,
    ];

    pub fn flag(self) -> MorphFlags {
        match self {
            PartOfSpeech::Noun => MorphFlags::NOUN,
            PartOfSpeech::Adjective => MorphFlags::ADJECTIVE,
            PartOfSpeech::Verb => MorphFlags::VERB,
            PartOfSpeech::Adverb => MorphFlags::ADVERB,
            PartOfSpeech::Article => MorphFlags::ARTICLE,
            PartOfSpeech::Preposition => MorphFlags::PREPOSITION,
            PartOfSpeech::Conjunction => MorphFlags::CONJUNCTION,
            PartOfSpeech::Pronoun => MorphFlags::PRONOUN,
            PartOfSpeech::Particle => MorphFlags::PARTICLE,
            PartOfSpeech::Interjection => MorphFlags::INTERJECTION,
        }
    }

    /// First part of speech carried by `flags`, if any.
    pub fn from_flags(flags: MorphFlags) -> Option<Self> {
        Self::ALL.into_iter().find(|pos| flags.contains(pos.flag()))
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct MorphFlags: u64 {
        // Case (Bits 0-4)
        const NOMINATIVE = 1 << 0;
        const GENITIVE = 1 << 1;
        const DATIVE = 1 << 2;
        const ACCUSATIVE = 1 << 3;
        const VOCATIVE = 1 << 4;

        // Gender (Bits 5-7)
        const MASCULINE = 1 << 5;
        const FEMININE = 1 << 6;
        const NEUTER = 1 << 7;

        // Number (Bits 8-9)
        const SINGULAR = 1 << 8;
        const PLURAL = 1 << 9;

        // Person (Bits 10-12)
        const FIRST_PERSON = 1 << 10;
        const SECOND_PERSON = 1 << 11;
        const THIRD_PERSON = 1 << 12;

        // Voice (Bits 13-15)
        const ACTIVE = 1 << 13;
        const MIDDLE = 1 << 14;
        const PASSIVE = 1 << 15;

        // Tense (Bits 16-21)
        const PRESENT = 1 << 16;
        const IMPERFECT = 1 << 17;
        const FUTURE = 1 << 18;
        const AORIST = 1 << 19;
        const PERFECT = 1 << 20;
        const PLUPERFECT = 1 << 21;

        // Mood (Bits 22-27)
        const INDICATIVE = 1 << 22;
        const SUBJUNCTIVE = 1 << 23;
        const OPTATIVE = 1 << 24;
        const IMPERATIVE = 1 << 25;
        const INFINITIVE = 1 << 26;
        const PARTICIPLE = 1 << 27;

        // Part of speech (Bits 32-41)
        const NOUN = 1 << 32;
        const ADJECTIVE = 1 << 33;
        const VERB = 1 << 34;
        const ADVERB = 1 << 35;
        const ARTICLE = 1 << 36;
        const PREPOSITION = 1 << 37;
        const CONJUNCTION = 1 << 38;
        const PRONOUN = 1 << 39;
        const PARTICLE = 1 << 40;
        const INTERJECTION = 1 << 41;

        // Lexical markers (Bits 48+)
        const RELATIVE = 1 << 48;
        const PROPER = 1 << 49;
        const INDECLINABLE = 1 << 50;
        const NUMERAL = 1 << 51;
    }
}

impl MorphFlags {
    pub const CASES: MorphFlags = MorphFlags::NOMINATIVE
        .union(MorphFlags::GENITIVE)
        .union(MorphFlags::DATIVE)
        .union(MorphFlags::ACCUSATIVE)
        .union(MorphFlags::VOCATIVE);

    pub fn part_of_speech(self) -> Option<PartOfSpeech> {
        PartOfSpeech::from_flags(self)
    }
}
