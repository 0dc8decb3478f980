//! The script engine — running a dialogue line by line.
//!
//! Each line moves through the same states:
//!
//! ```text
//! Speak ─┬─ (no responses) ─────────────────────────────────▶ next line
//!        └─ AwaitInput ─ Match ─┬─ ratio = 1 ───────────┐
//!              ▲                ├─ 0 < ratio < 1 ─ Elicit ─┤
//!              └─ not understood ┘                       Apply
//!                                                 ┌─────────┴─────────┐
//!                                             continue            defer:S
//!                                                │          (tail call into S)
//!                                            next line
//! ```
//!
//! Deferral never returns to the deferring script, so the engine runs it
//! as a loop rather than as recursion: the current script is swapped out
//! and its knowledge is either moved to the target or dropped.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::conversation::Conversation;
use crate::error::{EngineError, ScriptError};
use crate::frame::Frame;
use crate::knowledge::Knowledge;
use crate::matcher::{ResponseMatcher, Satisfaction};
use crate::ontology::{Ontology, Tagger};
use crate::registry::FrameRegistry;
use crate::script::{Action, Line, Response, Script, ScriptLibrary};
use crate::token::{Tokenizer, WordTokenizer};

/// How a script execution ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The script whose last line was reached; after deferrals this is the
    /// final target, not the script execution started with.
    pub script: String,
    /// That script's local knowledge when it finished.
    pub knowledge: Knowledge,
}

enum Step {
    Finished,
    Defer { script: String, transfer: bool },
}

/// Runs scripts from a [`ScriptLibrary`] against a [`Conversation`].
pub struct ScriptEngine<'a> {
    registry: &'a FrameRegistry,
    library: &'a ScriptLibrary,
    ontology: &'a dyn Ontology,
    tagger: &'a dyn Tagger,
    tokenizer: &'a dyn Tokenizer,
    config: EngineConfig,
}

impl<'a> ScriptEngine<'a> {
    pub fn new(
        registry: &'a FrameRegistry,
        library: &'a ScriptLibrary,
        ontology: &'a dyn Ontology,
        tagger: &'a dyn Tagger,
    ) -> Self {
        ScriptEngine {
            registry,
            library,
            ontology,
            tagger,
            tokenizer: &WordTokenizer,
            config: EngineConfig::default(),
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: &'a dyn Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn matcher(&self) -> ResponseMatcher<'_> {
        ResponseMatcher::new(self.registry, self.ontology, self.tokenizer, self.tagger)
            .with_max_hypernym_depth(self.config.max_hypernym_depth)
    }

    /// Execute the named script, optionally seeded with knowledge handed
    /// over by another script, following deferrals until a script runs
    /// out of lines.
    pub fn execute(
        &self,
        name: &str,
        transferred: Option<Knowledge>,
        conversation: &mut dyn Conversation,
    ) -> Result<Outcome, EngineError> {
        let mut script = self.script(name)?;
        let mut knowledge = seed(script, transferred);

        loop {
            info!(script = %script.name(), "executing script");
            match self.run(script, &mut knowledge, conversation)? {
                Step::Finished => {
                    return Ok(Outcome {
                        script: script.name().to_string(),
                        knowledge,
                    });
                }
                Step::Defer {
                    script: target,
                    transfer,
                } => {
                    let next = self.script(&target)?;
                    debug!(
                        from = %script.name(),
                        to = %next.name(),
                        transfer,
                        frames = knowledge.len(),
                        "deferring"
                    );
                    let carried = transfer.then(|| std::mem::take(&mut knowledge));
                    knowledge = seed(next, carried);
                    script = next;
                }
            }
        }
    }

    fn script(&self, name: &str) -> Result<&'a Script, ScriptError> {
        self.library
            .get(name)
            .ok_or_else(|| ScriptError::UnknownScript {
                name: name.to_string(),
            })
    }

    fn run(
        &self,
        script: &Script,
        knowledge: &mut Knowledge,
        conversation: &mut dyn Conversation,
    ) -> Result<Step, EngineError> {
        for line in script.lines() {
            let text = line.template.render(knowledge, self.registry)?;
            conversation.say(&text)?;

            if line.is_informational() {
                continue;
            }

            let (response, satisfaction) = self.await_response(line, knowledge, conversation)?;
            let frames = if satisfaction.is_complete() {
                satisfaction.frames
            } else {
                self.elicit(satisfaction.frames, conversation)?
            };
            knowledge.merge_all(frames.into_values());

            match &response.action {
                Action::Continue => {}
                Action::Defer { script, transfer } => {
                    return Ok(Step::Defer {
                        script: script.clone(),
                        transfer: *transfer,
                    });
                }
            }
        }
        Ok(Step::Finished)
    }

    fn listen(&self, conversation: &mut dyn Conversation) -> Result<String, EngineError> {
        conversation.listen()?.ok_or(EngineError::ConversationClosed)
    }

    /// Solicit replies until one of the line's responses matches at all.
    fn await_response<'l>(
        &self,
        line: &'l Line,
        knowledge: &Knowledge,
        conversation: &mut dyn Conversation,
    ) -> Result<(&'l Response, Satisfaction), EngineError> {
        loop {
            let reply = self.listen(conversation)?;
            if let Some(selected) = self.select(line, &reply, knowledge)? {
                return Ok(selected);
            }
            debug!(reply = %reply, "no response matched");
            conversation.say(&self.config.not_understood)?;
        }
    }

    /// The response with the strictly highest ratio above zero; ties keep
    /// the earlier response.
    fn select<'l>(
        &self,
        line: &'l Line,
        reply: &str,
        knowledge: &Knowledge,
    ) -> Result<Option<(&'l Response, Satisfaction)>, EngineError> {
        let matcher = self.matcher();
        let mut best: Option<(&'l Response, Satisfaction)> = None;
        let mut best_ratio = 0.0;

        for response in &line.responses {
            let satisfaction = matcher.satisfy(reply, &response.to_realize, knowledge)?;
            if satisfaction.ratio > best_ratio {
                best_ratio = satisfaction.ratio;
                best = Some((response, satisfaction));
            }
        }

        if let Some((response, satisfaction)) = &best {
            debug!(
                frames = ?response.to_realize,
                action = %response.action,
                ratio = satisfaction.ratio,
                "selected response"
            );
        }
        Ok(best)
    }

    /// Ask for every missing field, one at a time, until it is bound.
    fn elicit(
        &self,
        mut frames: IndexMap<String, Frame>,
        conversation: &mut dyn Conversation,
    ) -> Result<IndexMap<String, Frame>, EngineError> {
        let matcher = self.matcher();
        for frame in frames.values_mut() {
            for field in frame.unbound_fields() {
                loop {
                    conversation.say(&self.config.clarify_question(frame.name(), &field))?;
                    let reply = self.listen(conversation)?;
                    if matcher.satisfy_field(&reply, frame, &field)? {
                        let value = frame.binding(&field).unwrap_or_default();
                        conversation.say(&self.config.acknowledgement(value))?;
                        break;
                    }
                }
            }
        }
        Ok(frames)
    }
}

/// A script's starting knowledge: its local definitions, overridden by any
/// transferred frames of the same name.
fn seed(script: &Script, transferred: Option<Knowledge>) -> Knowledge {
    let mut knowledge = script.local_frames().clone();
    if let Some(transferred) = transferred {
        for frame in transferred.frames() {
            knowledge.insert(frame.clone());
        }
    }
    knowledge
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ScriptedConversation;
    use crate::filter::FieldFilter;
    use crate::ontology::Lexicon;
    use pretty_assertions::assert_eq;

    fn lexicon() -> Lexicon {
        Lexicon::new()
            .with_sense("cat.n.01", "noun.animal", &["cat"], &["animal.n.01"])
            .with_sense("dog.n.01", "noun.animal", &["dog"], &["animal.n.01"])
            .with_sense("animal.n.01", "noun.animal", &["animal"], &[])
    }

    fn registry() -> FrameRegistry {
        let mut registry = FrameRegistry::new();
        registry
            .register(
                Frame::builder("pet")
                    .field("species", FieldFilter::any().semantic(["animal"]))
                    .field("name", FieldFilter::any().pos(["NNP"]))
                    .build(),
            )
            .unwrap();
        registry
            .register(
                Frame::builder("answer")
                    .field("word", FieldFilter::any().pattern("yes|no").unwrap())
                    .build(),
            )
            .unwrap();
        registry
    }

    fn run(library: &ScriptLibrary, name: &str, replies: &[&str]) -> (Outcome, Vec<String>) {
        let lexicon = lexicon();
        let registry = registry();
        let engine = ScriptEngine::new(&registry, library, &lexicon, &lexicon);
        let mut conversation = ScriptedConversation::new(replies.iter().copied());
        let outcome = engine.execute(name, None, &mut conversation).unwrap();
        let said = conversation.said().into_iter().map(String::from).collect();
        (outcome, said)
    }

    #[test]
    fn informational_lines_need_no_input() {
        let mut library = ScriptLibrary::new();
        library
            .register(
                Script::builder("hello")
                    .line(Line::new("Hello."))
                    .line(Line::new("Goodbye."))
                    .build(),
            )
            .unwrap();
        let (outcome, said) = run(&library, "hello", &[]);
        assert_eq!(said, vec!["Hello.", "Goodbye."]);
        assert_eq!(outcome.script, "hello");
    }

    #[test]
    fn ties_keep_the_first_response() {
        let mut library = ScriptLibrary::new();
        library
            .register(
                Script::builder("ask")
                    .line(
                        Line::new("Do you have a pet?")
                            .response(Response::new(["answer"], Action::defer("first", false)))
                            .response(Response::new(["answer"], Action::defer("second", false))),
                    )
                    .build(),
            )
            .unwrap();
        library
            .register(Script::builder("first").line(Line::new("first")).build())
            .unwrap();
        library
            .register(Script::builder("second").line(Line::new("second")).build())
            .unwrap();

        let (outcome, said) = run(&library, "ask", &["yes"]);
        assert_eq!(outcome.script, "first");
        assert_eq!(said, vec!["Do you have a pet?", "first"]);
    }

    #[test]
    fn higher_ratio_wins_over_order() {
        let mut library = ScriptLibrary::new();
        library
            .register(
                Script::builder("ask")
                    .line(
                        Line::new("Tell me something.")
                            .response(Response::new(["pet", "answer"], Action::defer("both", false)))
                            .response(Response::new(["answer"], Action::defer("answer_only", false))),
                    )
                    .build(),
            )
            .unwrap();
        library
            .register(Script::builder("both").build())
            .unwrap();
        library
            .register(Script::builder("answer_only").build())
            .unwrap();

        let (outcome, _) = run(&library, "ask", &["no"]);
        assert_eq!(outcome.script, "answer_only");
    }

    #[test]
    fn unknown_script_is_an_error() {
        let library = ScriptLibrary::new();
        let lexicon = lexicon();
        let registry = registry();
        let engine = ScriptEngine::new(&registry, &library, &lexicon, &lexicon);
        let mut conversation = ScriptedConversation::default();
        assert!(matches!(
            engine.execute("missing", None, &mut conversation),
            Err(EngineError::Script(ScriptError::UnknownScript { .. }))
        ));
    }

    #[test]
    fn closed_conversation_stops_execution() {
        let mut library = ScriptLibrary::new();
        library
            .register(
                Script::builder("ask")
                    .line(Line::new("Yes or no?").response(Response::new(["answer"], Action::Continue)))
                    .build(),
            )
            .unwrap();
        let lexicon = lexicon();
        let registry = registry();
        let engine = ScriptEngine::new(&registry, &library, &lexicon, &lexicon);
        let mut conversation = ScriptedConversation::new(["maybe"]);
        assert!(matches!(
            engine.execute("ask", None, &mut conversation),
            Err(EngineError::ConversationClosed)
        ));
        assert_eq!(
            conversation.said(),
            vec!["Yes or no?", "Sorry, I did not understand that."]
        );
    }

    #[test]
    fn transferred_frames_override_local_definitions() {
        let script = Script::builder("s")
            .frame(Frame::builder("pet").field("name", FieldFilter::any()).build())
            .build();
        let mut bound = Frame::builder("pet").field("name", FieldFilter::any()).build();
        bound.bind("name", "Rex").unwrap();
        let transferred: Knowledge = [bound].into_iter().collect();

        let knowledge = seed(&script, Some(transferred));
        assert_eq!(knowledge.get("pet").unwrap().binding("name"), Some("Rex"));
        assert_eq!(seed(&script, None).get("pet").unwrap().binding("name"), None);
    }
}
