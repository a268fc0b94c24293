//! Feed URL adapter.

use calmerge_core::{CalendarSource, CanonicalEvent};
use tracing::{debug, info};

use crate::adapter::{BoxFuture, SourceAdapter, precondition_met};
use crate::config::ProviderSettings;
use crate::error::ProviderResult;
use crate::http;
use crate::normalize::normalize_events;

use super::feed::{feed_url, parse_feed};

/// Adapter for sources of type `ical`.
///
/// The source's `calendar_id` holds the feed URL; no credential is sent.
#[derive(Debug, Clone)]
pub struct IcalAdapter {
    http_client: reqwest::Client,
}

impl IcalAdapter {
    pub fn new(settings: &ProviderSettings) -> ProviderResult<Self> {
        Ok(Self {
            http_client: http::build_client(settings)?,
        })
    }

    async fn fetch_events(&self, source: &CalendarSource) -> ProviderResult<Vec<CanonicalEvent>> {
        if !precondition_met(source) {
            return Ok(Vec::new());
        }
        let Some(locator) = source.locator() else {
            return Ok(Vec::new());
        };
        let url = feed_url(locator);

        debug!(source = %source.id, url = %url, "fetching feed");
        let body = async {
            let response = http::send(self.http_client.get(&url)).await?;
            http::read_text(response).await
        }
        .await
        .map_err(|e| e.with_provider(self.name()))?;

        let raws = parse_feed(&body).map_err(|e| e.with_provider(self.name()))?;
        let events = normalize_events(&raws, source).map_err(|e| e.with_provider(self.name()))?;
        info!(source = %source.id, count = events.len(), "feed fetch complete");
        Ok(events)
    }
}

impl SourceAdapter for IcalAdapter {
    fn name(&self) -> &str {
        "ical"
    }

    fn fetch<'a>(
        &'a self,
        source: &'a CalendarSource,
    ) -> BoxFuture<'a, ProviderResult<Vec<CanonicalEvent>>> {
        Box::pin(self.fetch_events(source))
    }
}
