use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(name = "scriptbot")]
#[command(bin_name = "scriptbot")]
#[command(about = "Run frame-based dialogue scripts", long_about = None)]
pub struct ScriptbotCli {
    /// Directory of global frame definitions (`<frames>` files).
    #[arg(short, long)]
    pub frames: Option<PathBuf>,

    /// Directory of scripts (`<scenario>` files).
    #[arg(short, long)]
    pub scripts: PathBuf,

    /// Lexicon file providing senses, hypernyms and part-of-speech tags.
    #[arg(short, long)]
    pub lexicon: Option<PathBuf>,

    /// JSON engine configuration.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Read user replies from this file, one per line, instead of stdin.
    #[arg(short, long)]
    pub replay: Option<PathBuf>,

    /// Load and validate definitions, then exit without running.
    #[arg(long)]
    pub check: bool,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Name of the script to start with.
    #[arg(default_value = "main")]
    pub script: String,
}

impl ScriptbotCli {
    /// Log filter directive implied by `-v` flags, used when `RUST_LOG` is
    /// not set.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_flags_and_script_name() {
        let cli = ScriptbotCli::parse_from([
            "scriptbot", "-s", "scripts", "-f", "frames", "-vv", "intro",
        ]);
        assert_eq!(cli.scripts, PathBuf::from("scripts"));
        assert_eq!(cli.frames, Some(PathBuf::from("frames")));
        assert_eq!(cli.script, "intro");
        assert_eq!(cli.log_directive(), "debug");
    }

    #[test]
    fn script_defaults_to_main() {
        let cli = ScriptbotCli::parse_from(["scriptbot", "--scripts", "s"]);
        assert_eq!(cli.script, "main");
        assert!(!cli.check);
        assert_eq!(cli.log_directive(), "warn");
    }
}
