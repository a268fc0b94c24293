//! Account calendar adapter.
//!
//! Implements [`SourceAdapter`] on top of [`GoogleCalendarClient`]. The
//! bearer credential comes from the source itself; obtaining or refreshing it
//! is the caller's concern.

use calmerge_core::{CalendarSource, CanonicalEvent};
use tracing::{debug, info};

use crate::adapter::{BoxFuture, SourceAdapter, precondition_met};
use crate::config::ProviderSettings;
use crate::error::ProviderResult;
use crate::normalize::normalize_events;

use super::client::{DEFAULT_CALENDAR_ID, GoogleCalendarClient};

/// Adapter for sources of type `google`.
#[derive(Debug, Clone)]
pub struct GoogleAdapter {
    client: GoogleCalendarClient,
}

impl GoogleAdapter {
    /// Creates an adapter talking to `settings.google_api_base`.
    pub fn new(settings: &ProviderSettings) -> ProviderResult<Self> {
        Ok(Self {
            client: GoogleCalendarClient::new(settings)?,
        })
    }

    async fn fetch_events(&self, source: &CalendarSource) -> ProviderResult<Vec<CanonicalEvent>> {
        if !precondition_met(source) {
            return Ok(Vec::new());
        }
        let Some(token) = source.token() else {
            return Ok(Vec::new());
        };
        let calendar_id = source.locator().unwrap_or(DEFAULT_CALENDAR_ID);

        debug!(source = %source.id, calendar = calendar_id, "fetching calendar events");
        let raws = self
            .client
            .list_events(token, calendar_id)
            .await
            .map_err(|e| e.with_provider(self.name()))?;

        let events = normalize_events(&raws, source).map_err(|e| e.with_provider(self.name()))?;
        info!(source = %source.id, count = events.len(), "calendar fetch complete");
        Ok(events)
    }
}

impl SourceAdapter for GoogleAdapter {
    fn name(&self) -> &str {
        "google"
    }

    fn fetch<'a>(
        &'a self,
        source: &'a CalendarSource,
    ) -> BoxFuture<'a, ProviderResult<Vec<CanonicalEvent>>> {
        Box::pin(self.fetch_events(source))
    }
}
