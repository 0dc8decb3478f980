//! Line templates: literal text with `$frame.field` slot references.
//!
//! A reference is a `$`, an identifier, a literal `.`, and a second
//! identifier. Anything else, including a lone `$` or `$frame` without a
//! field, is literal text. Rendering substitutes each reference with its
//! bound value and leaves every other character untouched.

use std::fmt;

use nom::{
    IResult,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::recognize,
    sequence::{pair, preceded, separated_pair},
};

use crate::error::RenderError;
use crate::frame::normalize_name;
use crate::knowledge::Knowledge;
use crate::registry::FrameRegistry;

/// One piece of a parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Slot { frame: String, field: String },
}

/// A parsed line of dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn slot(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(char('$'), separated_pair(identifier, char('.'), identifier))(input)
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(index) = rest.find('$') {
            literal.push_str(&rest[..index]);
            rest = &rest[index..];
            match slot(rest) {
                Ok((remaining, (frame, field))) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot {
                        frame: normalize_name(frame),
                        field: field.to_string(),
                    });
                    rest = remaining;
                }
                Err(_) => {
                    literal.push('$');
                    rest = &rest[1..];
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Template {
            source: source.to_string(),
            segments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// `(frame, field)` pairs referenced by this template.
    pub fn references(&self) -> impl Iterator<Item = (&str, &str)> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Slot { frame, field } => Some((frame.as_str(), field.as_str())),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every reference, looking frames up locally first and
    /// globally second.
    pub fn render(
        &self,
        local: &Knowledge,
        global: &FrameRegistry,
    ) -> Result<String, RenderError> {
        let mut output = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Slot { frame, field } => {
                    let resolved = local.get(frame).or_else(|| global.get(frame)).ok_or_else(
                        || RenderError::UnresolvedFrame {
                            frame: frame.clone(),
                        },
                    )?;
                    let value =
                        resolved
                            .binding(field)
                            .ok_or_else(|| RenderError::UnboundField {
                                frame: frame.clone(),
                                field: field.clone(),
                            })?;
                    output.push_str(value);
                }
            }
        }
        Ok(output)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
