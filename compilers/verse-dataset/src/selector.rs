use nom::{
    bytes::complete::take_while1,
    character::complete::{char, digit1, space1},
    combinator::{all_consuming, map_res, opt},
    sequence::{preceded, tuple},
    IResult,
};
use verse_protocol::{Book, BookId, VerseRef};

use crate::DatasetError;

/// A holdout selector as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `JHN`
    Book(String),
    /// `JHN 3`
    Chapter { book: String, chapter: u32 },
    /// `JHN 3:16` or `JHN 3:16-18`
    Verses { book: String, chapter: u32, first: u32, last: u32 },
}

impl Selector {
    pub fn book(&self) -> &str {
        match self {
            Selector::Book(book) | Selector::Chapter { book, .. } | Selector::Verses { book, .. } => book,
        }
    }
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse)(input)
}

fn book_code(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric())(input)
}

fn selector(input: &str) -> IResult<&str, Selector> {
    let (input, book) = book_code(input)?;
    let (input, location) = opt(preceded(
        space1,
        tuple((number, opt(preceded(char(':'), tuple((number, opt(preceded(char('-'), number))))))))
    ))(input)?;

    let book = book.to_string();
    let selector = match location {
        None => Selector::Book(book),
        Some((chapter, None)) => Selector::Chapter { book, chapter },
        Some((chapter, Some((first, last)))) => Selector::Verses {
            book,
            chapter,
            first,
            last: last.unwrap_or(first),
        },
    };
    Ok((input, selector))
}

pub fn parse_selector(input: &str) -> Result<Selector, DatasetError> {
    let invalid = || DatasetError::InvalidSelector {
        selector: input.to_string(),
    };
    let (_, parsed) = all_consuming(selector)(input.trim()).map_err(|_| invalid())?;
    if let Selector::Verses { first, last, .. } = parsed {
        if first > last {
            return Err(invalid());
        }
    }
    Ok(parsed)
}

/// A selector bound to a book in the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSelector {
    pub book: BookId,
    scope: Scope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Whole,
    Chapter(u32),
    Verses { chapter: u32, first: u32, last: u32 },
}

impl ResolvedSelector {
    pub fn resolve(raw: &str, books: &[Book]) -> Result<Self, DatasetError> {
        let parsed = parse_selector(raw)?;
        let book = books
            .iter()
            .find(|b| b.code.eq_ignore_ascii_case(parsed.book()))
            .ok_or_else(|| DatasetError::UnknownBook {
                selector: raw.to_string(),
                code: parsed.book().to_string(),
            })?;

        let scope = match parsed {
            Selector::Book(_) => Scope::Whole,
            Selector::Chapter { chapter, .. } => Scope::Chapter(chapter),
            Selector::Verses { chapter, first, last, .. } => Scope::Verses { chapter, first, last },
        };
        Ok(Self { book: book.id, scope })
    }

    pub fn is_whole_book(&self) -> bool {
        self.scope == Scope::Whole
    }

    pub fn matches(&self, reference: &VerseRef) -> bool {
        if reference.book != self.book {
            return false;
        }
        match self.scope {
            Scope::Whole => true,
            Scope::Chapter(chapter) => reference.chapter == chapter,
            Scope::Verses { chapter, first, last } => {
                reference.chapter == chapter && (first..=last).contains(&reference.verse)
            }
        }
    }
}
