//! The conversation seam: where the engine speaks and listens.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// A turn-based channel between the agent and a user.
pub trait Conversation {
    /// Emit one line from the agent.
    fn say(&mut self, text: &str) -> io::Result<()>;

    /// Block for one line from the user. `None` means the user side is
    /// closed and no further input will arrive.
    fn listen(&mut self) -> io::Result<Option<String>>;
}

/// Who produced a line of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    Agent(String),
    User(String),
}

/// A conversation that replays prepared user replies and records
/// everything exchanged.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConversation {
    replies: VecDeque<String>,
    transcript: Vec<Turn>,
}

impl ScriptedConversation {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConversation {
            replies: replies.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Only the agent's lines, in order.
    pub fn said(&self) -> Vec<&str> {
        self.transcript
            .iter()
            .filter_map(|turn| match turn {
                Turn::Agent(text) => Some(text.as_str()),
                Turn::User(_) => None,
            })
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl Conversation for ScriptedConversation {
    fn say(&mut self, text: &str) -> io::Result<()> {
        self.transcript.push(Turn::Agent(text.to_string()));
        Ok(())
    }

    fn listen(&mut self) -> io::Result<Option<String>> {
        let reply = self.replies.pop_front();
        if let Some(reply) = &reply {
            self.transcript.push(Turn::User(reply.clone()));
        }
        Ok(reply)
    }
}

/// A line-oriented conversation over any reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
    prompt: String,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    /// The process's standard input and output.
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console {
            input,
            output,
            prompt: "> ".to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Conversation for Console<R, W> {
    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")?;
        self.output.flush()
    }

    fn listen(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "{}", self.prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
