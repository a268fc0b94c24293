//! Concurrent sync across all enabled sources.
//!
//! One tokio task is spawned per enabled source and every task is joined
//! before anything is returned. A failing source never hides the results of
//! the others: its error becomes a [`SourceFailure`] in the [`SyncReport`].

use std::collections::HashSet;
use std::time::Duration;

use calmerge_core::{CalendarSource, CanonicalEvent, EventKey};
use calmerge_providers::{
    AdapterRegistry, FailureKind, ProviderError, ProviderResult, ProviderSettings,
};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;

/// One source that could not be synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source_id: String,
    pub source_name: String,
    pub kind: FailureKind,
    pub message: String,
}

impl SourceFailure {
    fn from_error(source: &CalendarSource, err: &ProviderError) -> Self {
        Self {
            source_id: source.id.clone(),
            source_name: source.name.clone(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    fn timed_out(source: &CalendarSource, timeout: Duration) -> Self {
        Self {
            source_id: source.id.clone(),
            source_name: source.name.clone(),
            kind: FailureKind::Network,
            message: format!("fetch timed out after {}s", timeout.as_secs_f64()),
        }
    }

    fn crashed(source: &CalendarSource, err: &JoinError) -> Self {
        Self {
            source_id: source.id.clone(),
            source_name: source.name.clone(),
            kind: FailureKind::Network,
            message: format!("fetch task aborted: {}", err),
        }
    }
}

/// Outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Merged events, deduplicated by `(source_id, id)` and sorted by start.
    pub events: Vec<CanonicalEvent>,
    /// Sources whose fetch failed, in input order.
    pub failures: Vec<SourceFailure>,
    /// Number of enabled sources the pass attempted.
    pub attempted: usize,
}

impl SyncReport {
    /// True when no source failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when at least one source was attempted and every one failed.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failures.len() == self.attempted
    }

    /// Ids of the failed sources.
    pub fn failed_sources(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.source_id.as_str()).collect()
    }
}

/// Fans a sync pass out over the enabled sources.
#[derive(Debug, Clone)]
pub struct SyncOrchestrator {
    registry: AdapterRegistry,
    config: SyncConfig,
}

impl SyncOrchestrator {
    pub fn new(registry: AdapterRegistry, config: SyncConfig) -> Self {
        Self { registry, config }
    }

    /// Builds the HTTP-backed adapters from `settings`.
    pub fn from_settings(settings: &ProviderSettings, config: SyncConfig) -> ProviderResult<Self> {
        Ok(Self::new(AdapterRegistry::new(settings)?, config))
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Fetches every enabled source concurrently and merges the results.
    ///
    /// Never fails as a whole; see [`SyncReport::failures`].
    pub async fn sync(&self, sources: &[CalendarSource]) -> SyncReport {
        let enabled: Vec<&CalendarSource> = sources.iter().filter(|s| s.is_enabled).collect();
        debug!(
            total = sources.len(),
            enabled = enabled.len(),
            "starting sync pass"
        );

        let tasks = enabled.iter().map(|source| {
            let source = (*source).clone();
            let registry = self.registry.clone();
            let timeout = self.config.source_timeout;
            tokio::spawn(async move { fetch_source(&registry, &source, timeout).await })
        });
        let results = join_all(tasks).await;

        let mut batches = Vec::with_capacity(enabled.len());
        let mut failures = Vec::new();

        for (source, result) in enabled.iter().zip(results) {
            let failure = match result {
                Ok(Ok(Some(events))) => {
                    debug!(source = %source.id, count = events.len(), "source synced");
                    batches.push(events);
                    continue;
                }
                Ok(Ok(None)) => SourceFailure::timed_out(source, self.config.source_timeout),
                Ok(Err(err)) => SourceFailure::from_error(source, &err),
                Err(err) => SourceFailure::crashed(source, &err),
            };
            warn!(
                source = %failure.source_id,
                kind = %failure.kind,
                error = %failure.message,
                "source sync failed"
            );
            failures.push(failure);
        }

        let events = merge(batches);
        info!(
            sources = enabled.len(),
            events = events.len(),
            failed = failures.len(),
            "sync pass complete"
        );

        SyncReport {
            events,
            failures,
            attempted: enabled.len(),
        }
    }
}

/// Runs one source's fetch. `Ok(None)` means the timeout elapsed.
async fn fetch_source(
    registry: &AdapterRegistry,
    source: &CalendarSource,
    timeout: Duration,
) -> ProviderResult<Option<Vec<CanonicalEvent>>> {
    let adapter = registry.resolve(source.kind)?;
    match tokio::time::timeout(timeout, adapter.fetch(source)).await {
        Ok(result) => result.map(Some),
        Err(_) => Ok(None),
    }
}

/// Concatenates batches in order, keeps the first event per key, then sorts
/// by start. The sort is stable, so equal starts keep source order.
fn merge(batches: Vec<Vec<CanonicalEvent>>) -> Vec<CanonicalEvent> {
    let mut seen: HashSet<EventKey> = HashSet::new();
    let mut merged: Vec<CanonicalEvent> = batches
        .into_iter()
        .flatten()
        .filter(|event| seen.insert(event.key()))
        .collect();
    merged.sort_by_key(|event| event.start);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use calmerge_core::{EventTime, SourceKind};
    use calmerge_providers::{BoxFuture, ProviderErrorCode, SourceAdapter};
    use chrono::{DateTime, Utc};

    #[derive(Clone)]
    enum Behavior {
        Events(Vec<(&'static str, &'static str)>),
        Fail(ProviderErrorCode),
        Hang,
        Panic,
    }

    /// Adapter whose answer depends on the source id.
    struct ScriptedAdapter {
        name: &'static str,
        script: HashMap<&'static str, Behavior>,
    }

    impl SourceAdapter for ScriptedAdapter {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch<'a>(
            &'a self,
            source: &'a CalendarSource,
        ) -> BoxFuture<'a, ProviderResult<Vec<CanonicalEvent>>> {
            let behavior = self.script.get(source.id.as_str()).cloned();
            Box::pin(async move {
                match behavior {
                    None => Ok(Vec::new()),
                    Some(Behavior::Events(items)) => Ok(items
                        .into_iter()
                        .map(|(id, start)| event(source, id, start))
                        .collect()),
                    Some(Behavior::Fail(code)) => Err(ProviderError::new(code, "scripted")),
                    Some(Behavior::Hang) => {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok(Vec::new())
                    }
                    Some(Behavior::Panic) => panic!("adapter blew up"),
                }
            })
        }
    }

    fn event(source: &CalendarSource, id: &str, start: &str) -> CanonicalEvent {
        let start = EventTime::DateTime(start.parse::<DateTime<Utc>>().unwrap());
        CanonicalEvent::try_new(id, id, start, start, &source.id, &source.color).unwrap()
    }

    fn orchestrator(script: Vec<(&'static str, Behavior)>) -> SyncOrchestrator {
        let adapter: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter {
            name: "scripted",
            script: script.into_iter().collect(),
        });
        let registry = AdapterRegistry::with_adapters(adapter.clone(), adapter.clone(), adapter);
        SyncOrchestrator::new(registry, SyncConfig::default())
    }

    fn google(id: &str) -> CalendarSource {
        CalendarSource::new(id, SourceKind::Google, id.to_uppercase(), "red").with_token("t")
    }

    #[tokio::test]
    async fn merges_sorted_and_stamped() {
        let orch = orchestrator(vec![
            ("a", Behavior::Events(vec![("a1", "2025-06-19T12:00:00Z")])),
            (
                "b",
                Behavior::Events(vec![
                    ("b1", "2025-06-19T09:00:00Z"),
                    ("b2", "2025-06-20T09:00:00Z"),
                ]),
            ),
        ]);

        let report = orch.sync(&[google("a"), google("b")]).await;

        assert!(report.is_complete());
        assert_eq!(report.attempted, 2);
        let ids: Vec<_> = report.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["b1", "a1", "b2"]);
        assert!(report.events.iter().all(|e| e.color == "red"));
    }

    #[tokio::test]
    async fn duplicate_keys_keep_first() {
        let orch = orchestrator(vec![(
            "a",
            Behavior::Events(vec![
                ("same", "2025-06-19T12:00:00Z"),
                ("same", "2025-06-18T12:00:00Z"),
            ]),
        ), (
            "b",
            Behavior::Events(vec![("same", "2025-06-19T12:00:00Z")]),
        )]);

        let report = orch.sync(&[google("a"), google("b")]).await;

        let keys: HashSet<_> = report.events.iter().map(CanonicalEvent::key).collect();
        assert_eq!(keys.len(), report.events.len());
        assert_eq!(report.events.len(), 2);
        let from_a = report.events.iter().find(|e| e.source_id == "a").unwrap();
        assert_eq!(from_a.start.to_rfc3339(), "2025-06-19T12:00:00+00:00");
    }

    #[tokio::test]
    async fn failure_does_not_hide_other_sources() {
        let orch = orchestrator(vec![
            ("ok", Behavior::Events(vec![("e1", "2025-06-19T12:00:00Z")])),
            ("down", Behavior::Fail(ProviderErrorCode::ServerError)),
            ("denied", Behavior::Fail(ProviderErrorCode::AuthenticationFailed)),
        ]);

        let report = orch
            .sync(&[google("ok"), google("down"), google("denied")])
            .await;

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.failed_sources(), ["down", "denied"]);
        assert_eq!(report.failures[0].kind, FailureKind::Network);
        assert_eq!(report.failures[0].source_name, "DOWN");
        assert_eq!(report.failures[1].kind, FailureKind::Auth);
        assert!(!report.all_failed());
    }

    #[tokio::test]
    async fn disabled_sources_skipped() {
        let orch = orchestrator(vec![(
            "off",
            Behavior::Events(vec![("x", "2025-06-19T12:00:00Z")]),
        )]);

        let report = orch.sync(&[google("off").with_enabled(false)]).await;

        assert_eq!(report.attempted, 0);
        assert!(report.events.is_empty());
        assert!(!report.all_failed());
    }

    #[tokio::test]
    async fn unsupported_kind_reported() {
        let orch = orchestrator(vec![]);
        let board = CalendarSource::new("bb", SourceKind::Blackboard, "Board", "gray");

        let report = orch.sync(&[board]).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Unsupported);
        assert!(report.all_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out() {
        let orch = orchestrator(vec![
            ("slow", Behavior::Hang),
            ("fast", Behavior::Events(vec![("f", "2025-06-19T12:00:00Z")])),
        ]);

        let report = orch.sync(&[google("slow"), google("fast")]).await;

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.failed_sources(), ["slow"]);
        assert_eq!(report.failures[0].kind, FailureKind::Network);
        assert!(report.failures[0].message.contains("timed out"));
    }

    #[tokio::test]
    async fn panicking_adapter_isolated() {
        let orch = orchestrator(vec![
            ("boom", Behavior::Panic),
            ("fine", Behavior::Events(vec![("f", "2025-06-19T12:00:00Z")])),
        ]);

        let report = orch.sync(&[google("boom"), google("fine")]).await;

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.failed_sources(), ["boom"]);
    }

    #[tokio::test]
    async fn no_sources_is_empty_report() {
        let report = orchestrator(vec![]).sync(&[]).await;
        assert_eq!(report, SyncReport::default());
    }

    mod against_mock_server {
        use super::*;
        use calmerge_core::Recurrence;
        use serde_json::json;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const FEED: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\n\
BEGIN:VEVENT\r\nUID:feed-1\r\nDTSTART;VALUE=DATE:20250619\r\nSUMMARY:Holiday\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";

        #[tokio::test]
        async fn server_error_on_one_provider() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/calendars/primary/events"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/api/v1/calendar_events"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                    {
                        "id": 7,
                        "title": "Seminar",
                        "start_at": "2025-06-19T15:00:00Z",
                        "end_at": "2025-06-19T16:00:00Z",
                        "rrule": "FREQ=WEEKLY;BYDAY=TH"
                    }
                ])))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/feed.ics"))
                .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
                .mount(&server)
                .await;

            let settings = ProviderSettings::default()
                .with_google_api_base(server.uri())
                .unwrap()
                .with_canvas_base_url(server.uri())
                .unwrap();
            let orch = SyncOrchestrator::from_settings(&settings, SyncConfig::default()).unwrap();

            let sources = vec![
                CalendarSource::new("g", SourceKind::Google, "Work", "blue").with_token("t"),
                CalendarSource::new("c", SourceKind::Canvas, "School", "green").with_token("t"),
                CalendarSource::new("i", SourceKind::Ical, "Feed", "teal")
                    .with_calendar_id(format!("{}/feed.ics", server.uri())),
            ];
            let report = orch.sync(&sources).await;

            assert_eq!(report.failed_sources(), ["g"]);
            assert_eq!(report.failures[0].kind, FailureKind::Network);

            assert_eq!(report.events.len(), 2);
            // The all-day event starts at midnight and sorts first.
            assert_eq!(report.events[0].id, "feed-1");
            assert!(report.events[0].is_all_day);
            assert_eq!(report.events[0].color, "teal");
            assert_eq!(report.events[1].id, "7");
            assert_eq!(report.events[1].recurrence, Recurrence::Weekly);
            assert_eq!(report.events[1].color, "green");
        }
    }
}
