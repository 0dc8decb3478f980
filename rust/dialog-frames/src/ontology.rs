//! The lexical ontology and part-of-speech tagging seams.
//!
//! The engine consumes a WordNet-like sense graph through the [`Ontology`]
//! trait and a part-of-speech tagger through [`Tagger`]. Neither is
//! reimplemented here beyond [`Lexicon`], an in-memory sense graph that is
//! small enough to author by hand (or load from XML, see
//! [`crate::loader::load_lexicon`]) and implements both traits.
//!
//! ## Senses
//!
//! A sense carries two category tags:
//!
//! - the broad category, the equivalent of a WordNet lexname
//!   (`noun.animal`, `noun.food`, `verb.motion`, ...)
//! - the narrow category, the head lemma of the sense (`cat`, `feline`,
//!   `animal`, ...)
//!
//! and points upward to its hypernyms. The hypernym relation is a DAG: a
//! sense may have several parents and several paths may converge on the
//! same ancestor.

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

/// Identifier of a sense within an ontology (e.g. `cat.n.01`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SenseId(pub String);

impl SenseId {
    pub fn new(id: impl Into<String>) -> Self {
        SenseId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One meaning of a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sense {
    pub id: SenseId,
    /// Broad category, e.g. `noun.animal`.
    pub category: String,
    /// Narrow category, e.g. `cat`.
    pub narrow_category: String,
}

impl Sense {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        narrow_category: impl Into<String>,
    ) -> Self {
        Sense {
            id: SenseId::new(id),
            category: category.into(),
            narrow_category: narrow_category.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn narrow_category(&self) -> &str {
        &self.narrow_category
    }
}

/// A sense graph the matcher can query.
pub trait Ontology {
    /// Candidate senses of a word, most common first. An unknown word has
    /// no senses; that is not an error.
    fn senses(&self, word: &str) -> Vec<Sense>;

    /// Direct hypernyms (is-a parents) of a sense. Roots have none.
    fn hypernyms(&self, sense: &Sense) -> Vec<Sense>;
}

/// A Penn-treebank style part-of-speech tag (`NN`, `NNP`, `VBD`, ...).
///
/// Tags are normalized to uppercase so that filters and taggers agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PosTag(String);

impl PosTag {
    pub fn new(tag: impl AsRef<str>) -> Self {
        PosTag(tag.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the part of speech of a single word.
pub trait Tagger {
    fn tag(&self, word: &str) -> PosTag;
}

/// A sense together with its lemmas and hypernym links, as stored in a
/// [`Lexicon`].
#[derive(Debug, Clone)]
pub struct SenseEntry {
    pub sense: Sense,
    pub lemmas: Vec<String>,
    pub hypernyms: Vec<SenseId>,
}

/// An in-memory ontology and tagger.
///
/// Hypernym links are stored by id and resolved on lookup, so entries may
/// be inserted in any order. Links to ids that were never inserted are
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<SenseId, SenseEntry>,
    by_lemma: HashMap<String, Vec<SenseId>>,
    tags: HashMap<String, PosTag>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sense. Re-inserting an id replaces the previous entry.
    pub fn insert(&mut self, entry: SenseEntry) {
        let id = entry.sense.id.clone();
        if let Some(previous) = self.entries.remove(&id) {
            for lemma in &previous.lemmas {
                if let Some(ids) = self.by_lemma.get_mut(&lemma.to_lowercase()) {
                    ids.retain(|existing| existing != &id);
                }
            }
        }
        for lemma in &entry.lemmas {
            self.by_lemma
                .entry(lemma.to_lowercase())
                .or_default()
                .push(id.clone());
        }
        self.entries.insert(id, entry);
    }

    /// Shorthand: add a sense whose narrow category is its first lemma.
    pub fn with_sense(
        mut self,
        id: &str,
        category: &str,
        lemmas: &[&str],
        hypernyms: &[&str],
    ) -> Self {
        let narrow = lemmas.first().copied().unwrap_or(id);
        self.insert(SenseEntry {
            sense: Sense::new(id, category, narrow),
            lemmas: lemmas.iter().map(|l| l.to_string()).collect(),
            hypernyms: hypernyms.iter().map(|h| SenseId::new(*h)).collect(),
        });
        self
    }

    /// Pin the part of speech of a word, overriding every heuristic.
    pub fn set_tag(&mut self, word: &str, tag: PosTag) {
        self.tags.insert(word.to_lowercase(), tag);
    }

    pub fn with_tag(mut self, word: &str, tag: &str) -> Self {
        self.set_tag(word, PosTag::new(tag));
        self
    }

    pub fn sense(&self, id: &SenseId) -> Option<&Sense> {
        self.entries.get(id).map(|entry| &entry.sense)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tag_from_senses(&self, word: &str) -> Option<PosTag> {
        let id = self.by_lemma.get(word)?.first()?;
        let category = &self.entries.get(id)?.sense.category;
        let tag = match category.split('.').next()? {
            "noun" => "NN",
            "verb" => "VB",
            "adj" => "JJ",
            "adv" => "RB",
            _ => return None,
        };
        Some(PosTag::new(tag))
    }
}

impl Ontology for Lexicon {
    fn senses(&self, word: &str) -> Vec<Sense> {
        self.by_lemma
            .get(&word.to_lowercase())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.entries.get(id))
                    .map(|entry| entry.sense.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn hypernyms(&self, sense: &Sense) -> Vec<Sense> {
        let Some(entry) = self.entries.get(&sense.id) else {
            return Vec::new();
        };
        entry
            .hypernyms
            .iter()
            .filter_map(|id| {
                let parent = self.entries.get(id);
                if parent.is_none() {
                    trace!(sense = %sense.id, hypernym = %id, "dangling hypernym link");
                }
                parent.map(|parent| parent.sense.clone())
            })
            .collect()
    }
}

fn closed_class(word: &str) -> Option<&'static str> {
    let tag = match word {
        "i" | "me" | "you" | "he" | "she" | "it" | "we" | "they" | "him" | "her" | "us"
        | "them" => "PRP",
        "my" | "your" | "his" | "its" | "our" | "their" | "mine" => "PRP$",
        "a" | "an" | "the" | "this" | "that" | "these" | "those" | "some" | "any" | "no"
        | "every" => "DT",
        "in" | "on" | "at" | "of" | "for" | "with" | "from" | "by" | "about" | "into"
        | "like" => "IN",
        "to" => "TO",
        "and" | "or" | "but" => "CC",
        "is" | "has" | "does" => "VBZ",
        "am" | "are" | "have" | "do" => "VBP",
        "was" | "were" | "had" | "did" => "VBD",
        "be" => "VB",
        "can" | "could" | "will" | "would" | "should" | "may" | "might" | "must" => "MD",
        "what" | "who" | "whom" => "WP",
        "yes" | "yeah" | "hello" | "hi" | "ok" | "okay" | "sure" | "well" | "oh" | "um"
        | "please" | "thanks" => "UH",
        "not" => "RB",
        _ => return None,
    };
    Some(tag)
}

/// Guess a tag for a word the lexicon knows nothing about. Capitalized words
/// become proper nouns wherever they stand, including at the start of a
/// sentence, so common sentence openers belong in [`closed_class`] or in an
/// explicit tag.
fn tag_by_shape(word: &str) -> PosTag {
    let tag = if word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        "CD"
    } else if word.chars().next().is_some_and(char::is_uppercase) {
        "NNP"
    } else if word.len() > 4 && word.ends_with("ing") {
        "VBG"
    } else if word.len() > 3 && word.ends_with("ed") {
        "VBD"
    } else if word.len() > 3 && word.ends_with("ly") {
        "RB"
    } else {
        "NN"
    };
    PosTag::new(tag)
}

impl Tagger for Lexicon {
    /// Tag a word: explicit tags first, then the closed-class table, then
    /// the word's most common sense, then its shape.
    fn tag(&self, word: &str) -> PosTag {
        let lower = word.to_lowercase();
        if let Some(tag) = self.tags.get(&lower) {
            return tag.clone();
        }
        if let Some(tag) = closed_class(&lower) {
            return PosTag::new(tag);
        }
        if let Some(tag) = self.tag_from_senses(&lower) {
            return tag;
        }
        tag_by_shape(word)
    }
}
