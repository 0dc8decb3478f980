//! Loading definitions from disk and preparing conversations.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use dialog_frames::loader::{load_frames_dir, load_lexicon, load_scripts_dir};
use dialog_frames::{
    EngineConfig, FrameRegistry, Issue, Lexicon, LoadReport, ScriptEngine, ScriptLibrary,
    ScriptedConversation, Turn,
};
use tracing::info;

use crate::cli::ScriptbotCli;

/// Everything loaded from the definition files.
pub struct Definitions {
    pub registry: FrameRegistry,
    pub library: ScriptLibrary,
    pub lexicon: Lexicon,
}

fn summarize(kind: &str, report: &LoadReport) {
    info!(
        kind,
        loaded = report.loaded.len(),
        skipped = report.errors.len(),
        "loaded definitions"
    );
}

impl Definitions {
    pub fn load(cli: &ScriptbotCli) -> Result<Self> {
        let mut registry = FrameRegistry::new();
        if let Some(dir) = &cli.frames {
            let report = load_frames_dir(dir, &mut registry)
                .with_context(|| format!("loading frames from {}", dir.display()))?;
            summarize("frames", &report);
        }

        let mut library = ScriptLibrary::new();
        let report = load_scripts_dir(&cli.scripts, &mut library)
            .with_context(|| format!("loading scripts from {}", cli.scripts.display()))?;
        summarize("scripts", &report);

        let lexicon = match &cli.lexicon {
            Some(path) => load_lexicon(path)
                .with_context(|| format!("loading lexicon from {}", path.display()))?,
            None => Lexicon::new(),
        };

        Ok(Definitions {
            registry,
            library,
            lexicon,
        })
    }

    pub fn validate(&self) -> Vec<Issue> {
        self.library.validate(&self.registry)
    }

    pub fn engine(&self, config: EngineConfig) -> ScriptEngine<'_> {
        ScriptEngine::new(&self.registry, &self.library, &self.lexicon, &self.lexicon)
            .with_config(config)
    }
}

/// Read an engine configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing {}", path.display()))
}

/// One reply per line; blank lines are kept as empty replies.
pub fn replay(path: &Path) -> Result<ScriptedConversation> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(ScriptedConversation::new(source.lines()))
}

/// Write a replayed conversation in the same shape the console shows it.
pub fn print_transcript(transcript: &[Turn], out: &mut impl Write) -> io::Result<()> {
    for turn in transcript {
        match turn {
            Turn::Agent(text) => writeln!(out, "{text}")?,
            Turn::User(text) => writeln!(out, "> {text}")?,
        }
    }
    Ok(())
}
