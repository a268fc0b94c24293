//! Sync pass configuration.

use std::time::Duration;

use crate::error::{SyncError, SyncResult};

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Upper bound on one source's fetch, including every page it needs.
    /// A source that exceeds it is reported as a network failure.
    pub source_timeout: Duration,
}

impl SyncConfig {
    pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;

    pub fn new(source_timeout: Duration) -> Self {
        Self { source_timeout }
    }

    /// Builder: set the per-source timeout.
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns a config error if the timeout is zero.
    pub fn validate(&self) -> SyncResult<()> {
        if self.source_timeout.is_zero() {
            return Err(SyncError::config("source_timeout must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(Self::DEFAULT_SOURCE_TIMEOUT_SECS),
        }
    }
}
