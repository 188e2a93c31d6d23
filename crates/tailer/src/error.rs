use std::path::PathBuf;

use thiserror::Error;

/// Fatal outcomes of a follow loop, plus lifecycle misuse of a [`crate::Tailer`].
///
/// A source that is merely empty or not created yet never produces one of
/// these; see [`crate::ReadOutcome`].
#[derive(Debug, Error)]
pub enum TailError {
    #[error("failed to open `{path}` for following: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read from followed source: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write to output sink: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },
    #[error("tailer has already been started")]
    AlreadyStarted,
    #[error("tailer was not started or its result was already taken")]
    NotStarted,
    #[error("no tokio runtime available to run the follow loop")]
    NoRuntime,
    #[error("internal error: follow loop task failed: {0}")]
    Join(String),
}

/// Why a follow loop ended without error.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StopReason {
    /// `stop()` was called or the parent scope was cancelled.
    Cancelled,
    /// The scope's deadline elapsed.
    DeadlineExceeded,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tailer config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tailer config: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
    #[error("chunk_capacity must be greater than zero")]
    InvalidChunkCapacity,
}
