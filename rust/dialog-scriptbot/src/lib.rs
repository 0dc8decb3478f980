//! # Scriptbot
//!
//! Command line front end for [`dialog_frames`]: loads frame, script and
//! lexicon definitions from disk and runs a script against the terminal or
//! against a file of prepared replies.
//!
//! ```text
//! scriptbot --frames defs/frames --scripts defs/scripts --lexicon defs/lexicon.xml intro
//! ```

pub mod cli;
pub mod session;
