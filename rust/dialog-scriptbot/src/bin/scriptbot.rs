use std::io;

use anyhow::{Result, bail};
use clap::Parser;
use dialog_frames::Console;
use dialog_scriptbot::cli::ScriptbotCli;
use dialog_scriptbot::session::{Definitions, load_config, print_transcript, replay};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(cli: &ScriptbotCli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

pub fn main() -> Result<()> {
    let cli = ScriptbotCli::parse();
    init_tracing(&cli);

    let definitions = Definitions::load(&cli)?;
    let issues = definitions.validate();
    for issue in &issues {
        warn!(%issue, "definition problem");
    }

    if cli.check {
        for issue in &issues {
            println!("{issue}");
        }
        if !issues.is_empty() {
            bail!("{} problem(s) found", issues.len());
        }
        println!(
            "{} frame(s), {} script(s): ok",
            definitions.registry.len(),
            definitions.library.len()
        );
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let engine = definitions.engine(config);

    let outcome = match &cli.replay {
        Some(path) => {
            let mut conversation = replay(path)?;
            let outcome = engine.execute(&cli.script, None, &mut conversation);
            print_transcript(conversation.transcript(), &mut io::stdout().lock())?;
            outcome?
        }
        None => {
            let mut console = Console::stdio();
            engine.execute(&cli.script, None, &mut console)?
        }
    };

    info!(
        script = %outcome.script,
        frames = outcome.knowledge.len(),
        "conversation finished"
    );
    Ok(())
}
