//! Scripts: ordered dialogue lines and the replies they expect.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::error::ScriptError;
use crate::frame::{Frame, normalize_name};
use crate::knowledge::Knowledge;
use crate::registry::FrameRegistry;
use crate::template::Template;

/// What happens once a response has been fully satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Proceed to the next line of the current script.
    Continue,
    /// Hand control to another script, never returning.
    Defer {
        script: String,
        /// Whether the current local knowledge travels along.
        transfer: bool,
    },
}

impl Action {
    pub fn defer(script: impl AsRef<str>, transfer: bool) -> Self {
        Action::Defer {
            script: normalize_name(script.as_ref()),
            transfer,
        }
    }

    /// Parse `continue` or `defer:<script>`, attaching the transfer flag
    /// to a deferral.
    pub fn parse(action: &str, transfer: bool) -> Result<Self, ScriptError> {
        let action = action.trim();
        if action.eq_ignore_ascii_case("continue") {
            return Ok(Action::Continue);
        }
        match action.split_once(':') {
            Some((keyword, script))
                if keyword.trim().eq_ignore_ascii_case("defer") && !script.trim().is_empty() =>
            {
                Ok(Action::defer(script, transfer))
            }
            _ => Err(ScriptError::InvalidAction {
                action: action.to_string(),
            }),
        }
    }
}

impl FromStr for Action {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::parse(s, false)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Continue => write!(f, "continue"),
            Action::Defer { script, transfer } => {
                write!(f, "defer:{script}")?;
                if *transfer {
                    write!(f, " (transfer)")?;
                }
                Ok(())
            }
        }
    }
}

/// One acceptable kind of reply to a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Frames the reply must realize, by name.
    pub to_realize: Vec<String>,
    pub action: Action,
}

impl Response {
    pub fn new<I, S>(to_realize: I, action: Action) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Response {
            to_realize: to_realize
                .into_iter()
                .map(|name| normalize_name(name.as_ref()))
                .filter(|name| !name.is_empty())
                .collect(),
            action,
        }
    }
}

/// A line the agent says, and the replies it can take.
///
/// A line without responses is informational: it is said and the script
/// moves on without waiting for input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub template: Template,
    pub responses: Vec<Response>,
}

impl Line {
    pub fn new(text: &str) -> Self {
        Line {
            template: Template::parse(text),
            responses: Vec::new(),
        }
    }

    pub fn response(mut self, response: Response) -> Self {
        self.responses.push(response);
        self
    }

    pub fn is_informational(&self) -> bool {
        self.responses.is_empty()
    }
}

/// A named dialogue: its lines and its script-local frame definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    name: String,
    lines: Vec<Line>,
    local_frames: Knowledge,
}

impl Script {
    pub fn builder(name: impl AsRef<str>) -> ScriptBuilder {
        ScriptBuilder {
            script: Script {
                name: normalize_name(name.as_ref()),
                lines: Vec::new(),
                local_frames: Knowledge::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn local_frames(&self) -> &Knowledge {
        &self.local_frames
    }

    /// Check every reference this script makes against its own frames,
    /// the global registry and the script library.
    pub fn validate(&self, registry: &FrameRegistry, library: &ScriptLibrary) -> Vec<Issue> {
        let known = |frame: &str| self.local_frames.contains(frame) || registry.has(frame);
        let mut issues = Vec::new();

        for line in &self.lines {
            for (frame, _) in line.template.references() {
                if !known(frame) {
                    issues.push(Issue::UnknownSlotFrame {
                        script: self.name.clone(),
                        frame: frame.to_string(),
                    });
                }
            }
            for response in &line.responses {
                for frame in &response.to_realize {
                    if !known(frame) {
                        issues.push(Issue::UnknownFrame {
                            script: self.name.clone(),
                            frame: frame.clone(),
                        });
                    }
                }
                if let Action::Defer { script, .. } = &response.action {
                    if !library.has(script) {
                        issues.push(Issue::UnknownDeferTarget {
                            script: self.name.clone(),
                            target: script.clone(),
                        });
                    }
                }
            }
        }
        issues
    }
}

/// Builder for constructing scripts ergonomically.
pub struct ScriptBuilder {
    script: Script,
}

impl ScriptBuilder {
    pub fn line(mut self, line: Line) -> Self {
        self.script.lines.push(line);
        self
    }

    /// Add a script-local frame definition.
    pub fn frame(mut self, frame: Frame) -> Self {
        self.script.local_frames.insert(frame.instantiate());
        self
    }

    pub fn build(self) -> Script {
        self.script
    }
}

/// A problem found by [`ScriptLibrary::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Issue {
    #[error("script '{script}' expects unknown frame '{frame}'")]
    UnknownFrame { script: String, frame: String },

    #[error("script '{script}' refers to unknown frame '{frame}' in a line")]
    UnknownSlotFrame { script: String, frame: String },

    #[error("script '{script}' defers to unknown script '{target}'")]
    UnknownDeferTarget { script: String, target: String },
}

/// Every loaded script, by name.
#[derive(Debug, Clone, Default)]
pub struct ScriptLibrary {
    scripts: HashMap<String, Script>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, script: Script) -> Result<(), ScriptError> {
        if self.scripts.contains_key(script.name()) {
            return Err(ScriptError::DuplicateScript {
                name: script.name().to_string(),
            });
        }
        debug!(script = %script.name(), lines = script.lines().len(), "registered script");
        self.scripts.insert(script.name().to_string(), script);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Script> {
        self.scripts.get(&normalize_name(name))
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Validate every script, sorted by script name for stable output.
    pub fn validate(&self, registry: &FrameRegistry) -> Vec<Issue> {
        let mut names: Vec<&String> = self.scripts.keys().collect();
        names.sort();
        names
            .into_iter()
            .flat_map(|name| self.scripts[name].validate(registry, self))
            .collect()
    }
}
