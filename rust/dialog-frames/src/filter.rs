//! Field filters, the constraints a word must satisfy to fill a slot.
//!
//! A filter is a conjunction of up to four independent constraints:
//!
//! | constraint | checked against            | predicate        |
//! |------------|----------------------------|------------------|
//! | `lexical`  | a sense's broad category   | [`FieldFilter::sense_match`] |
//! | `semantic` | a sense's narrow category  | [`FieldFilter::sense_match`] |
//! | `pos`      | the word's part of speech  | [`FieldFilter::word_match`]  |
//! | `pattern`  | the word's surface form    | [`FieldFilter::word_match`]  |
//!
//! An absent constraint is a wildcard: it is satisfied by everything.
//!
//! ## Definition syntax
//!
//! ```text
//! species: noun.animal | animal, pet
//! name:    *           | *           | pos=NNP
//! answer:  *           | *           | pattern=yes|yeah|no
//! ```
//!
//! The first section is the lexical category, the second the comma
//! separated semantic categories; both accept `*` (or nothing) as the
//! wildcard. Keyed sections follow. `pattern=` always runs to the end of
//! the line so that regex alternation survives.

use std::collections::BTreeSet;
use std::fmt;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag_no_case, take_till, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, map, not, opt, rest},
    multi::many0,
    sequence::{preceded, terminated, tuple},
};
use regex::Regex;

use crate::error::FrameError;
use crate::ontology::{PosTag, Sense, Tagger};

/// A compiled lexical-form constraint.
///
/// The pattern must match the whole word, case-insensitively.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, FrameError> {
        let source = source.trim();
        let regex = Regex::new(&format!("(?i)^(?:{source})$")).map_err(|e| {
            FrameError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, word: &str) -> bool {
        self.regex.is_match(word)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

/// An immutable set of constraints on the word that may fill a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    lexical: Option<String>,
    semantic: Option<BTreeSet<String>>,
    pos: Option<BTreeSet<PosTag>>,
    pattern: Option<Pattern>,
}

impl FieldFilter {
    /// A filter with no constraints; it accepts every word and every sense.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn lexical(mut self, category: impl AsRef<str>) -> Self {
        self.lexical = Some(category.as_ref().trim().to_lowercase());
        self
    }

    pub fn semantic<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.semantic = Some(
            categories
                .into_iter()
                .map(|c| c.as_ref().trim().to_lowercase())
                .collect(),
        );
        self
    }

    pub fn pos<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pos = Some(tags.into_iter().map(PosTag::new).collect());
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Result<Self, FrameError> {
        self.pattern = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    pub fn lexical_category(&self) -> Option<&str> {
        self.lexical.as_deref()
    }

    pub fn semantic_categories(&self) -> Option<&BTreeSet<String>> {
        self.semantic.as_ref()
    }

    /// Whether binding requires ontology evidence at all.
    pub fn constrains_sense(&self) -> bool {
        self.lexical.is_some() || self.semantic.is_some()
    }

    /// Word-level check: surface pattern and part of speech.
    pub fn word_match(&self, word: &str, tagger: &dyn Tagger) -> bool {
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(word) {
                return false;
            }
        }
        if let Some(pos) = &self.pos {
            if !pos.contains(&tagger.tag(word)) {
                return false;
            }
        }
        true
    }

    /// Sense-level check: broad and narrow categories.
    pub fn sense_match(&self, sense: &Sense) -> bool {
        if let Some(lexical) = &self.lexical {
            if !sense.category().eq_ignore_ascii_case(lexical) {
                return false;
            }
        }
        if let Some(semantic) = &self.semantic {
            if !semantic.contains(&sense.narrow_category().to_lowercase()) {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexical.as_deref().unwrap_or("*"))?;
        match &self.semantic {
            Some(semantic) => {
                let joined: Vec<&str> = semantic.iter().map(String::as_str).collect();
                write!(f, " | {}", joined.join(", "))?;
            }
            None => write!(f, " | *")?,
        }
        if let Some(pos) = &self.pos {
            let joined: Vec<&str> = pos.iter().map(PosTag::as_str).collect();
            write!(f, " | pos={}", joined.join(","))?;
        }
        if let Some(pattern) = &self.pattern {
            write!(f, " | pattern={}", pattern.as_str())?;
        }
        Ok(())
    }
}

enum FilterOption<'a> {
    Pos(&'a str),
    Pattern(&'a str),
}

fn field_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

fn section(input: &str) -> IResult<&str, &str> {
    take_till(|c| c == '|')(input)
}

fn option_key(input: &str) -> IResult<&str, &str> {
    preceded(
        space0,
        terminated(
            alt((tag_no_case("pattern"), tag_no_case("pos"))),
            tuple((space0, char('='))),
        ),
    )(input)
}

fn filter_option(input: &str) -> IResult<&str, FilterOption<'_>> {
    preceded(
        char('|'),
        alt((
            map(
                preceded(tuple((space0, tag_no_case("pattern"), space0, char('='))), rest),
                FilterOption::Pattern,
            ),
            map(
                preceded(tuple((space0, tag_no_case("pos"), space0, char('='))), section),
                FilterOption::Pos,
            ),
        )),
    )(input)
}

type FieldLine<'a> = (&'a str, &'a str, Option<&'a str>, Vec<FilterOption<'a>>);

fn field_line(input: &str) -> IResult<&str, FieldLine<'_>> {
    let (input, (_, name, _, _)) = tuple((space0, field_name, space0, char(':')))(input)?;
    let (input, lexical) = section(input)?;
    let (input, semantic) = opt(preceded(char('|'), preceded(not(option_key), section)))(input)?;
    let (input, options) = all_consuming(many0(filter_option))(input)?;
    Ok((input, (name, lexical, semantic, options)))
}

fn wildcard(section: &str) -> Option<&str> {
    let section = section.trim();
    (!section.is_empty() && section != "*").then_some(section)
}

fn list(section: &str) -> Option<Vec<&str>> {
    let items: Vec<&str> = section
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();
    (!items.is_empty() && !items.contains(&"*")).then_some(items)
}

/// Parse one `field: lexical | semantic | key=value` definition line.
pub fn parse_field_line(line: &str) -> Result<(String, FieldFilter), FrameError> {
    let invalid = |reason: String| FrameError::InvalidFilter {
        line: line.trim().to_string(),
        reason,
    };

    let (_, (name, lexical, semantic, options)) =
        field_line(line).map_err(|e| invalid(e.to_string()))?;

    let mut filter = FieldFilter::any();
    if let Some(lexical) = wildcard(lexical) {
        filter = filter.lexical(lexical);
    }
    if let Some(semantic) = semantic.and_then(list) {
        filter = filter.semantic(semantic);
    }
    for option in options {
        match option {
            FilterOption::Pos(tags) => {
                if let Some(tags) = list(tags) {
                    filter = filter.pos(tags);
                }
            }
            FilterOption::Pattern(pattern) => {
                if pattern.trim().is_empty() {
                    return Err(invalid("empty pattern".into()));
                }
                filter = filter.pattern(pattern)?;
            }
        }
    }

    Ok((name.to_string(), filter))
}
