//! LMS calendar API client.

use std::sync::LazyLock;

use calmerge_core::EventTime;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ProviderSettings;
use crate::error::{ProviderError, ProviderResult};
use crate::http;
use crate::raw_event::RawEvent;
use crate::rrule;

/// Items requested per page.
const PER_PAGE: u32 = 100;

/// Hard stop on pagination in case a server keeps handing out `next` links.
const MAX_PAGES: usize = 50;

static NEXT_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]+)>\s*;\s*rel="?next"?"#).expect("Invalid Link header regex")
});

/// LMS API client bound to one instance.
#[derive(Debug, Clone)]
pub struct CanvasClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CanvasClient {
    pub fn new(settings: &ProviderSettings) -> ProviderResult<Self> {
        Ok(Self {
            http_client: http::build_client(settings)?,
            base_url: settings.canvas_base().to_string(),
        })
    }

    /// Lists all calendar events visible to the token.
    ///
    /// `context_code` narrows the listing to one course or user
    /// (e.g. `course_42`).
    pub async fn list_events(
        &self,
        access_token: &str,
        context_code: Option<&str>,
    ) -> ProviderResult<Vec<RawEvent>> {
        let mut request = self
            .http_client
            .get(format!("{}/api/v1/calendar_events", self.base_url))
            .query(&[
                ("all_events", "true".to_string()),
                ("per_page", PER_PAGE.to_string()),
            ]);
        if let Some(code) = context_code {
            request = request.query(&[("context_codes[]", code)]);
        }

        let mut all_events = Vec::new();
        let mut pages = 0;

        loop {
            let response = http::send(request.bearer_auth(access_token)).await?;
            let next = next_page_url(response.headers());
            let items: Vec<ApiCalendarEvent> = http::read_json(response).await?;
            pages += 1;

            for item in items {
                if let Some(raw) = convert_event(item)? {
                    all_events.push(raw);
                }
            }

            match next {
                Some(url) if pages < MAX_PAGES => request = self.http_client.get(url),
                Some(_) => {
                    warn!(pages, "pagination limit reached, stopping");
                    break;
                }
                None => break,
            }
        }

        debug!(pages, count = all_events.len(), "fetched LMS events");
        Ok(all_events)
    }
}

/// Extracts the `rel="next"` target of a `Link` header.
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|part| NEXT_LINK_REGEX.captures(part).map(|c| c[1].to_string()))
}

/// Converts one API item. Items without a start are skipped.
fn convert_event(event: ApiCalendarEvent) -> ProviderResult<Option<RawEvent>> {
    let id = event.id.into_string();

    let Some(start_at) = event.start_at.as_deref() else {
        debug!(id = %id, "skipping item without start_at");
        return Ok(None);
    };
    let start = parse_timestamp(&id, start_at)?;
    let end = match event.end_at.as_deref() {
        Some(end_at) => parse_timestamp(&id, end_at)?,
        None => start,
    };

    let rule = event.rrule.filter(|r| !r.trim().is_empty());

    let mut raw = RawEvent::new(id, start, end)
        .with_location(event.location_name.unwrap_or_default())
        .with_recurs(rule.is_some());
    raw.title = event.title;
    if let Some(rule) = rule {
        raw.recurrence_end = rrule::until_date(&rule);
        raw.weekdays = rrule::weekdays(&rule);
    }

    Ok(Some(raw))
}

fn parse_timestamp(id: &str, value: &str) -> ProviderResult<EventTime> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| EventTime::DateTime(dt.with_timezone(&Utc)))
        .map_err(|e| {
            ProviderError::parse(format!("event {}: bad timestamp {:?}: {}", id, value, e))
                .with_source(e)
        })
}

/// Identifiers arrive as numbers from most instances and as strings from some.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteId {
    Number(i64),
    Text(String),
}

impl RemoteId {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiCalendarEvent {
    id: RemoteId,
    title: Option<String>,
    start_at: Option<String>,
    end_at: Option<String>,
    location_name: Option<String>,
    rrule: Option<String>,
}
