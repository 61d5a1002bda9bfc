pub mod matcher;
pub mod text;

use serde::{Deserialize, Serialize};
use verse_protocol::{CharRange, Token, Verse, VerseRef};

pub use crate::matcher::MatchMethod;

/// Which text variant of a verse tokens are aligned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    Raw,
    #[default]
    Cleaned,
}

impl TextSource {
    pub fn select(self, verse: &Verse) -> &str {
        match self {
            TextSource::Raw => &verse.raw_text,
            TextSource::Cleaned => &verse.clean_text,
        }
    }
}

/// Cursor policy after a token could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// Skip as many chars as the token has, assuming it is present but garbled.
    #[default]
    AdvanceByLength,
    /// Leave the cursor where it is, assuming the token is absent from the text.
    HoldCursor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    pub text_source: TextSource,
    /// Maximum distance, in chars, between the cursor and a match start.
    pub lookahead: usize,
    pub recovery: Recovery,
    /// A verse whose unplaced ratio exceeds this is flagged for audit.
    pub audit_threshold: f64,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            text_source: TextSource::Cleaned,
            lookahead: 120,
            recovery: Recovery::AdvanceByLength,
            audit_threshold: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedToken<'a> {
    pub position: usize,
    pub token: &'a Token,
    /// `None` when the token could not be placed.
    pub range: Option<CharRange>,
    pub method: Option<MatchMethod>,
}

impl AlignedToken<'_> {
    pub fn is_placed(&self) -> bool {
        self.range.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct VerseAlignment<'a> {
    pub reference: VerseRef,
    pub text: &'a str,
    pub chars: Vec<char>,
    pub tokens: Vec<AlignedToken<'a>>,
}

impl VerseAlignment<'_> {
    pub fn unplaced(&self) -> usize {
        self.tokens.iter().filter(|t| !t.is_placed()).count()
    }

    pub fn unplaced_ratio(&self) -> f64 {
        if self.tokens.is_empty() {
            return 0.0;
        }
        self.unplaced() as f64 / self.tokens.len() as f64
    }

    pub fn needs_audit(&self, threshold: f64) -> bool {
        self.unplaced_ratio() > threshold
    }

    /// Text covered by `range`.
    pub fn slice(&self, range: CharRange) -> String {
        self.chars[range.start..range.end].iter().collect()
    }
}

pub struct Aligner<'c> {
    config: &'c AlignConfig,
}

impl<'c> Aligner<'c> {
    pub fn new(config: &'c AlignConfig) -> Self {
        Self { config }
    }

    /// Primary entry point: Verse -> Aligned Tokens over the configured text.
    pub fn align<'a>(&self, verse: &'a Verse) -> VerseAlignment<'a> {
        let text = self.config.text_source.select(verse);
        let chars: Vec<char> = text.chars().collect();
        let tokens = self.align_tokens(&verse.tokens, &chars);

        let alignment = VerseAlignment {
            reference: verse.reference,
            text,
            chars,
            tokens,
        };
        if alignment.needs_audit(self.config.audit_threshold) {
            tracing::debug!(
                verse = %alignment.reference,
                unplaced = alignment.unplaced(),
                total = alignment.tokens.len(),
                "verse exceeds unplaced-token threshold"
            );
        }
        alignment
    }

    /// Greedy single forward pass. The output has the input's length and order.
    pub fn align_tokens<'a>(&self, tokens: &'a [Token], text: &[char]) -> Vec<AlignedToken<'a>> {
        let mut pos = 0;
        let mut aligned = Vec::with_capacity(tokens.len());

        for (position, token) in tokens.iter().enumerate() {
            let needle: Vec<char> = token.text.trim().chars().collect();

            match matcher::find(text, pos, self.config.lookahead, &needle) {
                Some((range, method)) => {
                    pos = range.end;
                    aligned.push(AlignedToken {
                        position,
                        token,
                        range: Some(range),
                        method: Some(method),
                    });
                }
                None => {
                    tracing::trace!(position, token = %token.text, cursor = pos, "token unplaced");
                    if self.config.recovery == Recovery::AdvanceByLength {
                        pos = (pos + needle.len()).min(text.len());
                    }
                    aligned.push(AlignedToken {
                        position,
                        token,
                        range: None,
                        method: None,
                    });
                }
            }
        }

        aligned
    }
}
