//! SourceAdapter trait definition.
//!
//! One adapter exists per implemented provider. Adapters are responsible for:
//! - checking the source's precondition (credential or feed URL present)
//! - fetching the provider's raw data
//! - normalizing it into [`CanonicalEvent`]s stamped with the source identity

use std::future::Future;
use std::pin::Pin;

use calmerge_core::{CalendarSource, CanonicalEvent};
use tracing::debug;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Boxing keeps the trait object-safe so adapters can be shared as
/// `Arc<dyn SourceAdapter>` across spawned sync tasks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetches and normalizes events for one provider type.
///
/// # Implementation Notes
///
/// - A source that does not meet the adapter's precondition yields
///   `Ok(vec![])`, not an error. Use [`precondition_met`].
/// - An empty calendar is a successful empty list.
/// - Malformed data fails the whole fetch; never return partial results.
pub trait SourceAdapter: Send + Sync {
    /// Returns the provider name (e.g. "google", "ical").
    fn name(&self) -> &str;

    /// Fetches all events visible through `source`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` for transport, auth and parse failures.
    fn fetch<'a>(
        &'a self,
        source: &'a CalendarSource,
    ) -> BoxFuture<'a, ProviderResult<Vec<CanonicalEvent>>>;
}

/// Checks that `source` carries what its provider needs.
///
/// Token providers need a non-blank `auth_token`; feed providers need a
/// non-blank `calendar_id`. A missing requirement is logged, not raised.
pub fn precondition_met(source: &CalendarSource) -> bool {
    if source.kind.requires_token() && source.token().is_none() {
        debug!(source = %source.id, kind = %source.kind, "no credential, skipping fetch");
        return false;
    }
    if source.kind.requires_calendar_id() && source.locator().is_none() {
        debug!(source = %source.id, kind = %source.kind, "no feed locator, skipping fetch");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use calmerge_core::SourceKind;

    #[test]
    fn token_providers_need_token() {
        let google = CalendarSource::new("g", SourceKind::Google, "G", "red");
        assert!(!precondition_met(&google));
        assert!(precondition_met(&google.clone().with_token("t")));

        let canvas = CalendarSource::new("c", SourceKind::Canvas, "C", "red").with_token("");
        assert!(!precondition_met(&canvas));
    }

    #[test]
    fn feed_provider_needs_locator() {
        let ical = CalendarSource::new("i", SourceKind::Ical, "I", "red");
        assert!(!precondition_met(&ical));
        assert!(precondition_met(
            &ical.with_calendar_id("https://example.com/feed.ics")
        ));
    }

    #[test]
    fn google_does_not_need_locator() {
        let google = CalendarSource::new("g", SourceKind::Google, "G", "red").with_token("t");
        assert!(precondition_met(&google));
    }
}
