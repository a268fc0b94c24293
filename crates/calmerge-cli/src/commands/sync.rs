//! One-shot sync command.

use std::fmt::Write as _;

use calmerge_core::{CalendarSource, CanonicalEvent};
use calmerge_sync::{JsonFileStore, SourceStore, SyncOrchestrator, SyncReport};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Syncs every enabled source once and prints the merged events.
///
/// Returns `PartialSync` when some sources failed, after printing
/// everything that was fetched.
pub async fn run(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let store = JsonFileStore::new(config.store_path());
    let report = sync_once(config, &store).await?;

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| ClientError::Config(format!("failed to serialize report: {}", e)))?;
        println!("{}", out);
    } else {
        print!("{}", render_report(&report));
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(ClientError::PartialSync {
            failed: report.failures.len(),
            attempted: report.attempted,
        })
    }
}

/// Loads the owner's sources from `store` and runs one pass.
pub async fn sync_once(config: &ClientConfig, store: &dyn SourceStore) -> ClientResult<SyncReport> {
    let sources = store.load_all(&config.owner_id).await?;
    debug!(owner = %config.owner_id, count = sources.len(), "loaded sources");

    let orchestrator =
        SyncOrchestrator::from_settings(&config.provider_settings()?, config.sync_config()?)?;
    Ok(sync_sources(&orchestrator, sources).await)
}

/// Resolves credential references, then syncs. Unresolvable references are
/// folded into the report as failures.
pub async fn sync_sources(
    orchestrator: &SyncOrchestrator,
    sources: Vec<CalendarSource>,
) -> SyncReport {
    let (ready, unresolved) = secret::resolve_tokens(sources).await;
    let mut report = orchestrator.sync(&ready).await;
    report.attempted += unresolved.len();
    report.failures.extend(unresolved);
    report
}

/// Human-readable report: one line per event, then failures.
pub fn render_report(report: &SyncReport) -> String {
    let mut out = String::new();

    if report.events.is_empty() {
        out.push_str("No events\n");
    }
    for event in &report.events {
        let _ = writeln!(out, "{}", render_event(event));
    }

    if !report.failures.is_empty() {
        out.push('\n');
        for failure in &report.failures {
            let _ = writeln!(
                out,
                "failed: {} ({}) [{}] {}",
                failure.source_name, failure.source_id, failure.kind, failure.message
            );
        }
    }

    out
}

fn render_event(event: &CanonicalEvent) -> String {
    let day = event.start.format("%a %Y-%m-%d");
    let when = if event.is_all_day {
        "all day    ".to_string()
    } else {
        format!("{}-{}", event.start.format("%H:%M"), event.end.format("%H:%M"))
    };

    let mut line = format!("{}  {}  {}", day, when, event.title);
    if event.recurrence.is_recurring() {
        line.push_str(" (weekly)");
    }
    if !event.location.is_empty() {
        let _ = write!(line, " @ {}", event.location);
    }
    let _ = write!(line, "  [{}]", event.source_id);
    line
}
