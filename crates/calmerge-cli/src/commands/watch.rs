//! Periodic sync until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use calmerge_sync::{
    JsonFileStore, SchedulerConfig, SourceStore, SyncOrchestrator, SyncReport, SyncScheduler,
};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::ClientResult;

use super::sync::{render_report, sync_sources};

pub async fn run(config: &ClientConfig, interval: Option<u64>) -> ClientResult<()> {
    let scheduler_config = match interval.filter(|s| *s > 0) {
        Some(secs) => SchedulerConfig::new(Duration::from_secs(secs)),
        None => config.scheduler_config()?,
    };

    let orchestrator = Arc::new(SyncOrchestrator::from_settings(
        &config.provider_settings()?,
        config.sync_config()?,
    )?);
    let store: Arc<dyn SourceStore> = Arc::new(JsonFileStore::new(config.store_path()));
    let owner_id = Arc::new(config.owner_id.clone());

    let scheduler = SyncScheduler::new(scheduler_config);
    let handle = scheduler.handle();

    let task = tokio::spawn(scheduler.run(move || {
        let store = Arc::clone(&store);
        let orchestrator = Arc::clone(&orchestrator);
        let owner_id = Arc::clone(&owner_id);
        async move {
            let report = watch_pass(store.as_ref(), &orchestrator, &owner_id).await;
            print!("{}", render_report(&report));
            report
        }
    }));

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, stopping");
    // The scheduler may already be gone if it exited on its own.
    let _ = handle.stop().await;
    if let Err(e) = task.await {
        warn!(error = %e, "scheduler task ended abnormally");
    }

    let state = handle.state().await;
    println!(
        "{} passes, last error: {}",
        state.passes,
        state.last_error.as_deref().unwrap_or("none")
    );
    Ok(())
}

/// One scheduled pass. A store failure yields an empty report so the
/// scheduler keeps running.
pub async fn watch_pass(
    store: &dyn SourceStore,
    orchestrator: &SyncOrchestrator,
    owner_id: &str,
) -> SyncReport {
    match store.load_all(owner_id).await {
        Ok(sources) => sync_sources(orchestrator, sources).await,
        Err(e) => {
            warn!(error = %e, "failed to load sources");
            SyncReport::default()
        }
    }
}
