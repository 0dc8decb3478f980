//! # Dialog Frames — Frame-Based Scripted Dialogue
//!
//! A dialogue engine where an agent walks through authored scripts, line by
//! line, and understands the user's replies by filling the slots of
//! semantic frames.
//!
//! ## Core Ideas
//!
//! - **Frames are slot sets**: a frame names a handful of fields, each
//!   guarded by a [`FieldFilter`] that constrains the word allowed to fill
//!   it by part of speech, surface pattern, or ontological category.
//! - **Categories are found upward**: a word whose own sense does not match
//!   a filter may still fill the field if one of its hypernyms does
//!   (`cat` fills a field that wants an `animal`).
//! - **Replies are scored, not parsed**: every response a line accepts is a
//!   list of frames; the one whose frames end up best filled wins, and
//!   missing fields are asked for one at a time.
//! - **Scripts chain**: a response may hand control to another script,
//!   optionally carrying the knowledge gathered so far.
//!
//! ## Architecture
//!
//! ```text
//! Line (template) → Render ($frame.field slots) → Say
//!   → Listen → Tokenize → Bind tokens to fields (filters + hypernyms)
//!     → Score responses (satisfaction ratio) → Clarify missing fields
//!       → Merge into knowledge → Continue | Defer
//! ```

pub mod config;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod filter;
pub mod frame;
pub mod hypernym;
pub mod knowledge;
pub mod loader;
pub mod matcher;
pub mod ontology;
pub mod registry;
pub mod script;
pub mod template;
pub mod token;

pub use config::EngineConfig;
pub use conversation::{Console, Conversation, ScriptedConversation, Turn};
pub use engine::{Outcome, ScriptEngine};
pub use error::{EngineError, FrameError, LoadError, RenderError, ScriptError};
pub use filter::{FieldFilter, Pattern, parse_field_line};
pub use frame::{Frame, FrameBuilder};
pub use hypernym::HypernymSearch;
pub use knowledge::Knowledge;
pub use loader::LoadReport;
pub use matcher::{ResponseMatcher, Satisfaction, satisfaction_ratio};
pub use ontology::{Lexicon, Ontology, PosTag, Sense, SenseEntry, SenseId, Tagger};
pub use registry::FrameRegistry;
pub use script::{Action, Issue, Line, Response, Script, ScriptBuilder, ScriptLibrary};
pub use template::{Segment, Template};
pub use token::{Token, Tokenizer, WordTokenizer, tokenize};
