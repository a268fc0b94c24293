//! Sync error types.
//!
//! Per-source fetch failures are not errors at this level; they are reported
//! as [`SourceFailure`](crate::SourceFailure) data inside a sync report.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Result type for source store operations.
pub type StoreResult<T> = Result<T, SyncError>;

/// Errors raised by the store, configuration and scheduler plumbing.
#[derive(Debug, Error)]
pub enum SyncError {
    /// IO error reading or writing the store file.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Store file content is not a valid source list.
    #[error("invalid source store {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A source with the given id does not exist.
    #[error("unknown source: {id}")]
    UnknownSource { id: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The scheduler loop has stopped and no longer accepts commands.
    #[error("scheduler is not running")]
    SchedulerStopped,
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            path: path.into(),
            source,
        }
    }

    pub fn unknown_source(id: impl Into<String>) -> Self {
        Self::UnknownSource { id: id.into() }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
