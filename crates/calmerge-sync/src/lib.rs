//! Sync orchestration for calmerge.
//!
//! This crate ties adapters and source definitions together:
//! - Concurrent fan-out over enabled sources with per-source timeouts
//! - Merge, dedup by `(source_id, id)` and sort of the fetched events
//! - Storage contract for source definitions (memory and JSON file)
//! - Credential refresh lifecycle driven by foreground/background hooks
//! - Periodic background sync with a randomized interval and retry delays
//!
//! # Example
//!
//! ```rust,no_run
//! use calmerge_providers::ProviderSettings;
//! use calmerge_sync::{JsonFileStore, SourceStore, SyncConfig, SyncOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = JsonFileStore::new("sources.json");
//!     let sources = store.load_all("me").await?;
//!
//!     let orchestrator =
//!         SyncOrchestrator::from_settings(&ProviderSettings::default(), SyncConfig::default())?;
//!     let report = orchestrator.sync(&sources).await;
//!     println!("{} events, {} failures", report.events.len(), report.failures.len());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod lifecycle;
mod orchestrator;
mod scheduler;
mod store;

pub use config::SyncConfig;
pub use error::{StoreResult, SyncError, SyncResult};
pub use lifecycle::{CredentialRefresher, RefreshLifecycle};
pub use orchestrator::{SourceFailure, SyncOrchestrator, SyncReport};
pub use scheduler::{
    RetryPolicy, SchedulerCommand, SchedulerConfig, SchedulerHandle, SchedulerState,
    SharedSchedulerState, SyncScheduler,
};
pub use store::{JsonFileStore, MemoryStore, SourceStore, set_enabled};
