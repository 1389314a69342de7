use crate::types::{Phase, Ticks};
use std::fmt;
use thiserror::Error;

/// Which engine query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Position,
    Duration,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Position => write!(f, "current position"),
            QueryKind::Duration => write!(f, "duration"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Element could not be created: {factory} ({name})")]
    ElementCreation { factory: String, name: String },

    #[error("'{from}' could not be linked with '{to}'")]
    Link { from: String, to: String },

    #[error("Link pad '{pad}' to '{sink}' failed")]
    PadLink { pad: String, sink: String },

    #[error("Engine error: {message}")]
    Engine {
        message: String,
        debug: Option<String>,
    },

    #[error("Unable to set the pipeline to the {phase} state")]
    StateChange { phase: Phase },

    #[error("Could not query {query}")]
    QueryFailed { query: QueryKind },

    #[error("Seek to {target} was rejected")]
    SeekRejected { target: Ticks },

    #[error("End of stream could not be delivered")]
    EndOfStreamRejected,

    #[error("Engine initialization failed: {message}")]
    Init { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, SessionError>;
