//! Crate error definitions.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "rocksdb")]
    #[error("engine error: {0}")]
    Engine(#[from] rocksdb::Error),

    #[error("key '{}' not found", String::from_utf8_lossy(.0))]
    KeyNotFound(Vec<u8>),

    #[error("statistics line {line}: size token '{token}' is not an integer")]
    StatsParse { line: usize, token: String },

    #[error("`{command}` failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("phase {phase} stopped after {completed} of {requested} operations")]
    PartialPhase {
        phase: &'static str,
        completed: usize,
        requested: usize,
    },
}
