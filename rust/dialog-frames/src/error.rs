//! Error types for the frame engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while defining, registering or resolving frames.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame '{name}' is already registered")]
    DuplicateFrame { name: String },

    #[error("frame '{name}' is not defined locally or globally")]
    UnknownFrame { name: String },

    #[error("frame '{frame}' has no field '{field}'")]
    UnknownField { frame: String, field: String },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid field filter '{line}': {reason}")]
    InvalidFilter { line: String, reason: String },
}

/// Errors raised while substituting slot references into a line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("slot reference to unknown frame '{frame}'")]
    UnresolvedFrame { frame: String },

    #[error("slot reference '${frame}.{field}' has no binding")]
    UnboundField { frame: String, field: String },
}

/// Errors raised while building or looking up scripts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("invalid action '{action}': expected 'continue' or 'defer:<script>'")]
    InvalidAction { action: String },

    #[error("script '{name}' is already registered")]
    DuplicateScript { name: String },

    #[error("script '{name}' not found")]
    UnknownScript { name: String },
}

/// Errors raised while reading definition files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {path}: {reason}")]
    Xml { path: PathBuf, reason: String },

    #[error("{path}: {reason}")]
    Structure { path: PathBuf, reason: String },

    #[error("{path}: {source}")]
    Frame {
        path: PathBuf,
        #[source]
        source: FrameError,
    },

    #[error("{path}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: ScriptError,
    },
}

/// Errors that stop a running script.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("conversation closed while waiting for input")]
    ConversationClosed,

    #[error("conversation I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
