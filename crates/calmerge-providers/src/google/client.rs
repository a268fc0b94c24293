//! Account calendar API client.
//!
//! Low-level HTTP access to the events listing endpoint, plus the mapping
//! from the API's JSON items onto [`RawEvent`]s.

use calmerge_core::EventTime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ProviderSettings;
use crate::error::{ProviderError, ProviderResult};
use crate::http;
use crate::raw_event::RawEvent;
use crate::rrule;

/// Calendar used when the source does not name one.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Page size requested from the events endpoint.
const PAGE_SIZE: usize = 250;

/// Hard stop on pagination in case a server keeps handing out page tokens.
pub(crate) const MAX_PAGES: usize = 40;

/// Calendar API client bound to one base URL.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl GoogleCalendarClient {
    /// Creates a client from the shared adapter settings.
    pub fn new(settings: &ProviderSettings) -> ProviderResult<Self> {
        Ok(Self {
            http_client: http::build_client(settings)?,
            api_base: settings.google_base().to_string(),
        })
    }

    /// Lists every event of `calendar_id`, following `nextPageToken`.
    ///
    /// Recurring series are expanded server-side (`singleEvents=true`).
    /// Cancelled items are dropped.
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
    ) -> ProviderResult<Vec<RawEvent>> {
        let mut all_events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            pages += 1;
            let page = self
                .list_events_page(access_token, calendar_id, page_token.as_deref())
                .await?;

            for item in page.items {
                if let Some(raw) = convert_event(item)? {
                    all_events.push(raw);
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() && pages < MAX_PAGES => {
                    page_token = Some(token)
                }
                Some(token) if !token.is_empty() => {
                    warn!(pages, calendar = calendar_id, "pagination limit reached, stopping");
                    break;
                }
                _ => break,
            }
        }

        debug!(calendar = calendar_id, count = all_events.len(), "fetched events");
        Ok(all_events)
    }

    async fn list_events_page(
        &self,
        access_token: &str,
        calendar_id: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<EventListResponse> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(calendar_id)
        );

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", PAGE_SIZE.to_string()),
            ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = http::send(request).await?;
        http::read_json(response).await
    }
}

/// Converts one API item. Returns `Ok(None)` for cancelled items.
fn convert_event(event: ApiEvent) -> ProviderResult<Option<RawEvent>> {
    if event.status.as_deref() == Some("cancelled") {
        return Ok(None);
    }

    let id = event
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProviderError::parse("event without id"))?;

    let start = parse_time(&event.start)
        .map_err(|e| ProviderError::parse(format!("event {}: bad start: {}", id, e)))?;
    let end = match event.end {
        Some(ref end) => parse_time(end)
            .map_err(|e| ProviderError::parse(format!("event {}: bad end: {}", id, e)))?,
        None => start,
    };

    let rules = event.recurrence.unwrap_or_default();
    let recurs = !rules.is_empty() || event.recurring_event_id.is_some();
    let until = rules.iter().find_map(|rule| rrule::until_date(rule));

    let mut raw = RawEvent::new(id, start, end).with_recurs(recurs);
    raw.title = event.summary;
    raw.location = event.location;
    raw.recurrence_end = until;

    Ok(Some(raw))
}

/// `dateTime` wins over `date`; a date-only value marks an all-day event.
fn parse_time(time: &ApiEventTime) -> Result<EventTime, String> {
    match (&time.date_time, &time.date) {
        (Some(dt), _) => DateTime::parse_from_rfc3339(dt)
            .map(|parsed| EventTime::DateTime(parsed.with_timezone(&Utc)))
            .map_err(|e| e.to_string()),
        (None, Some(date)) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(EventTime::Date)
            .map_err(|e| e.to_string()),
        (None, None) => Err("missing date and dateTime".to_string()),
    }
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// A single event from the calendar API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    #[serde(default)]
    start: ApiEventTime,
    end: Option<ApiEventTime>,
    status: Option<String>,
    recurring_event_id: Option<String>,
    recurrence: Option<Vec<String>>,
}

/// Event time from the API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}
