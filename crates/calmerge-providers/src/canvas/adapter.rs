//! LMS calendar adapter.

use calmerge_core::{CalendarSource, CanonicalEvent};
use tracing::{debug, info};

use crate::adapter::{BoxFuture, SourceAdapter, precondition_met};
use crate::config::ProviderSettings;
use crate::error::ProviderResult;
use crate::normalize::normalize_events;

use super::client::CanvasClient;

/// Adapter for sources of type `canvas`.
#[derive(Debug, Clone)]
pub struct CanvasAdapter {
    client: CanvasClient,
}

impl CanvasAdapter {
    /// Creates an adapter talking to `settings.canvas_base_url`.
    pub fn new(settings: &ProviderSettings) -> ProviderResult<Self> {
        Ok(Self {
            client: CanvasClient::new(settings)?,
        })
    }

    async fn fetch_events(&self, source: &CalendarSource) -> ProviderResult<Vec<CanonicalEvent>> {
        if !precondition_met(source) {
            return Ok(Vec::new());
        }
        let Some(token) = source.token() else {
            return Ok(Vec::new());
        };

        debug!(source = %source.id, context = ?source.locator(), "fetching LMS events");
        let raws = self
            .client
            .list_events(token, source.locator())
            .await
            .map_err(|e| e.with_provider(self.name()))?;

        let events = normalize_events(&raws, source).map_err(|e| e.with_provider(self.name()))?;
        info!(source = %source.id, count = events.len(), "LMS fetch complete");
        Ok(events)
    }
}

impl SourceAdapter for CanvasAdapter {
    fn name(&self) -> &str {
        "canvas"
    }

    fn fetch<'a>(
        &'a self,
        source: &'a CalendarSource,
    ) -> BoxFuture<'a, ProviderResult<Vec<CanonicalEvent>>> {
        Box::pin(self.fetch_events(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureKind, ProviderErrorCode};
    use calmerge_core::{Recurrence, SourceKind};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter_for(server: &MockServer) -> CanvasAdapter {
        let settings = ProviderSettings::default()
            .with_canvas_base_url(server.uri())
            .unwrap();
        CanvasAdapter::new(&settings).unwrap()
    }

    fn source() -> CalendarSource {
        CalendarSource::new("c-1", SourceKind::Canvas, "School", "orange").with_token("lms-token")
    }

    #[tokio::test]
    async fn fetches_with_bearer_and_maps_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/calendar_events"))
            .and(header("authorization", "Bearer lms-token"))
            .and(query_param("all_events", "true"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 101,
                    "title": "Lecture",
                    "start_at": "2025-06-17T14:00:00Z",
                    "end_at": "2025-06-17T15:30:00Z",
                    "location_name": "Hall B",
                    "rrule": "FREQ=WEEKLY;BYDAY=TU"
                },
                { "id": 102, "title": "No date" },
                {
                    "id": "103",
                    "title": "Office hours",
                    "start_at": "2025-06-18T09:00:00Z"
                }
            ])))
            .mount(&server)
            .await;

        let events = adapter_for(&server).fetch(&source()).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "101");
        assert_eq!(events[0].location, "Hall B");
        assert_eq!(events[0].recurrence, Recurrence::Weekly);
        assert!(events[0].weekdays.contains(&2));
        assert_eq!(events[0].duration_minutes(), 90);
        assert_eq!(events[0].color, "orange");

        assert_eq!(events[1].id, "103");
        assert_eq!(events[1].location, "");
        assert_eq!(events[1].start, events[1].end);
        assert_eq!(events[1].recurrence, Recurrence::None);
        assert!(events.iter().all(|e| !e.is_all_day));
    }

    #[tokio::test]
    async fn context_code_filter_and_pagination() {
        let server = MockServer::start().await;
        let next = format!("{}/api/v1/calendar_events?page=2", server.uri());

        Mock::given(method("GET"))
            .and(path("/api/v1/calendar_events"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 2, "start_at": "2025-06-20T10:00:00Z" }
            ])))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/calendar_events"))
            .and(query_param("context_codes[]", "course_42"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Link", format!("<{}>; rel=\"next\"", next).as_str())
                    .set_body_json(json!([
                        { "id": 1, "start_at": "2025-06-19T10:00:00Z" }
                    ])),
            )
            .with_priority(2)
            .mount(&server)
            .await;

        let source = source().with_calendar_id("course_42");
        let events = adapter_for(&server).fetch(&source).await.unwrap();

        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[tokio::test]
    async fn missing_token_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let no_token = CalendarSource::new("c-2", SourceKind::Canvas, "School", "orange");
        assert!(adapter_for(&server).fetch(&no_token).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn forbidden_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = adapter_for(&server).fetch(&source()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthorizationFailed);
        assert_eq!(err.kind(), FailureKind::Auth);
        assert_eq!(err.provider(), Some("canvas"));
    }

    #[tokio::test]
    async fn server_error_is_network_class() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = adapter_for(&server).fetch(&source()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Network);
    }

    #[tokio::test]
    async fn object_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errors": [] })))
            .mount(&server)
            .await;

        let err = adapter_for(&server).fetch(&source()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Parse);
    }
}
