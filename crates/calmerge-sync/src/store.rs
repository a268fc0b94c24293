//! Source definition storage.
//!
//! The sync core only needs two things from wherever source definitions
//! live: load every source of an owner, and insert or replace one source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use calmerge_core::CalendarSource;
use calmerge_providers::BoxFuture;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::{StoreResult, SyncError};

/// Load/save contract for [`CalendarSource`] records.
pub trait SourceStore: Send + Sync {
    /// Returns every source owned by `owner_id`, in stored order.
    fn load_all<'a>(&'a self, owner_id: &'a str) -> BoxFuture<'a, StoreResult<Vec<CalendarSource>>>;

    /// Inserts `source`, or replaces the stored record with the same id.
    fn upsert<'a>(&'a self, source: &'a CalendarSource) -> BoxFuture<'a, StoreResult<()>>;
}

/// Flips `is_enabled` on the stored source `id` of `owner_id`.
///
/// # Errors
///
/// Returns `UnknownSource` if the owner has no such source.
pub async fn set_enabled(
    store: &dyn SourceStore,
    owner_id: &str,
    id: &str,
    enabled: bool,
) -> StoreResult<CalendarSource> {
    let source = store
        .load_all(owner_id)
        .await?
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| SyncError::unknown_source(id))?
        .with_enabled(enabled);
    store.upsert(&source).await?;
    Ok(source)
}

fn upsert_into(records: &mut Vec<CalendarSource>, source: &CalendarSource) {
    match records.iter_mut().find(|r| r.id == source.id) {
        Some(existing) => *existing = source.clone(),
        None => records.push(source.clone()),
    }
}

/// In-process store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<CalendarSource>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `sources`.
    pub fn with_sources(sources: impl IntoIterator<Item = CalendarSource>) -> Self {
        Self {
            records: Arc::new(RwLock::new(sources.into_iter().collect())),
        }
    }
}

impl SourceStore for MemoryStore {
    fn load_all<'a>(&'a self, owner_id: &'a str) -> BoxFuture<'a, StoreResult<Vec<CalendarSource>>> {
        Box::pin(async move {
            let records = self.records.read().await;
            Ok(records
                .iter()
                .filter(|s| s.owner_id == owner_id)
                .cloned()
                .collect())
        })
    }

    fn upsert<'a>(&'a self, source: &'a CalendarSource) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            upsert_into(&mut *self.records.write().await, source);
            Ok(())
        })
    }
}

/// Store backed by a JSON array file.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target. On Unix the file is restricted to its owner since records carry
/// credentials.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record. A missing file is an empty store.
    async fn read_records(&self) -> StoreResult<Vec<CalendarSource>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SyncError::io(&self.path, e)),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| SyncError::corrupt(&self.path, e))
    }

    async fn write_records(&self, records: &[CalendarSource]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::io(parent, e))?;
        }

        let content =
            serde_json::to_string_pretty(records).map_err(|e| SyncError::corrupt(&self.path, e))?;

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|e| SyncError::io(&temp_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&temp_path, perms)
                .await
                .map_err(|e| SyncError::io(&temp_path, e))?;
        }

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| SyncError::io(&self.path, e))?;

        debug!(path = %self.path.display(), count = records.len(), "saved sources");
        Ok(())
    }
}

impl SourceStore for JsonFileStore {
    fn load_all<'a>(&'a self, owner_id: &'a str) -> BoxFuture<'a, StoreResult<Vec<CalendarSource>>> {
        Box::pin(async move {
            let records = self.read_records().await?;
            Ok(records
                .into_iter()
                .filter(|s| s.owner_id == owner_id)
                .collect())
        })
    }

    fn upsert<'a>(&'a self, source: &'a CalendarSource) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            let mut records = self.read_records().await?;
            upsert_into(&mut records, source);
            self.write_records(&records).await
        })
    }
}
