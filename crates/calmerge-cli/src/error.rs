//! Client error types.

use std::fmt;
use std::process::ExitCode;

use calmerge_providers::ProviderError;
use calmerge_sync::SyncError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Provider setup error.
    Provider(String),
    /// Source store error.
    Store(SyncError),
    /// IO error.
    Io(std::io::Error),
    /// Invalid command-line input.
    Usage(String),
    /// A sync pass finished but some sources failed.
    PartialSync { failed: usize, attempted: usize },
}

impl ClientError {
    /// Process exit code for this error.
    ///
    /// A sync with per-source failures exits with 2 so scripts can tell it
    /// apart from a run that could not start at all.
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::PartialSync { .. } => 2,
            _ => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
            Self::Store(err) => write!(f, "source store error: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Usage(msg) => write!(f, "{}", msg),
            Self::PartialSync { failed, attempted } => {
                write!(f, "{} of {} sources failed to sync", failed, attempted)
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SyncError> for ClientError {
    fn from(err: SyncError) -> Self {
        Self::Store(err)
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err.to_string())
    }
}
