//! The response matcher — from a free-text reply to bound frames.
//!
//! ```text
//! reply ─ tokenize ─┬─ word_match (pattern, pos) ──┐
//!                   └─ senses ─ sense_match ─ hypernym search ─┴─ bind
//!                                                                   │
//!                                  bound fields / total fields ─ ratio
//! ```
//!
//! Matching never mutates the caller's knowledge: frames are resolved into
//! independent copies (reusing a local instance when one exists so its
//! bindings carry over), filled, and handed back in a [`Satisfaction`]. The
//! caller decides whether to merge them.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::FrameError;
use crate::filter::FieldFilter;
use crate::frame::{Frame, normalize_name};
use crate::hypernym::HypernymSearch;
use crate::knowledge::Knowledge;
use crate::ontology::{Ontology, Sense, Tagger};
use crate::registry::FrameRegistry;
use crate::token::{Token, Tokenizer};

/// The outcome of matching one reply against the frames a response wants.
#[derive(Debug, Clone, PartialEq)]
pub struct Satisfaction {
    /// Fraction of fields bound across all realized frames, in `[0, 1]`.
    pub ratio: f64,
    /// The realized frames by name, in the order they were requested.
    pub frames: IndexMap<String, Frame>,
}

impl Satisfaction {
    pub fn is_complete(&self) -> bool {
        self.ratio >= 1.0
    }

    pub fn frame(&self, name: &str) -> Option<&Frame> {
        self.frames.get(&normalize_name(name))
    }

    pub fn into_frames(self) -> impl Iterator<Item = Frame> {
        self.frames.into_values()
    }
}

/// Bound fields over total fields across `frames`.
///
/// A set of frames with no fields at all is vacuously satisfied.
pub fn satisfaction_ratio<'a>(frames: impl IntoIterator<Item = &'a Frame>) -> f64 {
    let (bound, total) = frames.into_iter().fold((0, 0), |(bound, total), frame| {
        (bound + frame.bound_count(), total + frame.field_count())
    });
    if total == 0 {
        1.0
    } else {
        bound as f64 / total as f64
    }
}

/// Binds words from user replies to frame fields.
pub struct ResponseMatcher<'a> {
    registry: &'a FrameRegistry,
    ontology: &'a dyn Ontology,
    tokenizer: &'a dyn Tokenizer,
    tagger: &'a dyn Tagger,
    max_hypernym_depth: Option<usize>,
}

impl<'a> ResponseMatcher<'a> {
    pub fn new(
        registry: &'a FrameRegistry,
        ontology: &'a dyn Ontology,
        tokenizer: &'a dyn Tokenizer,
        tagger: &'a dyn Tagger,
    ) -> Self {
        ResponseMatcher {
            registry,
            ontology,
            tokenizer,
            tagger,
            max_hypernym_depth: None,
        }
    }

    pub fn with_max_hypernym_depth(mut self, depth: Option<usize>) -> Self {
        self.max_hypernym_depth = depth;
        self
    }

    /// Resolve a frame name to an instance: the local one if present,
    /// otherwise a fresh copy of the global template.
    pub fn resolve(&self, name: &str, local: &Knowledge) -> Result<Frame, FrameError> {
        if let Some(frame) = local.get(name) {
            return Ok(frame.clone());
        }
        self.registry
            .instantiate(name)
            .ok_or_else(|| FrameError::UnknownFrame {
                name: normalize_name(name),
            })
    }

    /// Match `answer` against the frames named in `to_realize`.
    ///
    /// Fields bound before the call stay bound; only the remaining ones are
    /// tried, and the first token that satisfies a field wins it.
    pub fn satisfy(
        &self,
        answer: &str,
        to_realize: &[String],
        local: &Knowledge,
    ) -> Result<Satisfaction, FrameError> {
        let mut frames = IndexMap::new();
        for name in to_realize {
            let frame = self.resolve(name, local)?;
            frames.entry(frame.name().to_string()).or_insert(frame);
        }

        let tokens = self.tokenizer.tokenize(answer);
        for token in &tokens {
            let senses = self.ontology.senses(&token.value);
            for frame in frames.values_mut() {
                self.bind_token(token, &senses, frame, None)?;
            }
        }

        let ratio = satisfaction_ratio(frames.values());
        debug!(answer, ?to_realize, ratio, "computed satisfaction");
        Ok(Satisfaction { ratio, frames })
    }

    /// Match `answer` against a single field of `frame`, binding it in
    /// place. Returns whether the field ended up bound.
    pub fn satisfy_field(
        &self,
        answer: &str,
        frame: &mut Frame,
        field: &str,
    ) -> Result<bool, FrameError> {
        if frame.field(field).is_none() {
            return Err(FrameError::UnknownField {
                frame: frame.name().to_string(),
                field: field.to_string(),
            });
        }
        for token in self.tokenizer.tokenize(answer) {
            if frame.is_bound(field) {
                break;
            }
            let senses = self.ontology.senses(&token.value);
            self.bind_token(&token, &senses, frame, Some(field))?;
        }
        Ok(frame.is_bound(field))
    }

    fn bind_token(
        &self,
        token: &Token,
        senses: &[Sense],
        frame: &mut Frame,
        only: Option<&str>,
    ) -> Result<(), FrameError> {
        let accepted: Vec<String> = frame
            .fields()
            .filter(|(field, _)| only.is_none_or(|only| only == *field))
            .filter(|(field, _)| !frame.is_bound(field))
            .filter(|(_, filter)| self.accepts(token, senses, filter))
            .map(|(field, _)| field.to_string())
            .collect();

        for field in accepted {
            frame.bind(&field, token.original.clone())?;
        }
        Ok(())
    }

    fn accepts(&self, token: &Token, senses: &[Sense], filter: &FieldFilter) -> bool {
        if !filter.word_match(&token.original, self.tagger) {
            return false;
        }
        if !filter.constrains_sense() {
            return true;
        }
        // No senses means no semantic evidence for this word.
        let search = HypernymSearch::new(self.ontology).with_max_depth(self.max_hypernym_depth);
        senses.iter().any(|sense| search.search(sense, filter))
    }
}
