//! RawEvent to CanonicalEvent conversion.
//!
//! The normalization step is shared by every adapter:
//! 1. default the title
//! 2. reject events that end before they start
//! 3. stamp the originating source id and color
//! 4. map recurrence metadata onto the provisional `none | weekly` model

use calmerge_core::{CalendarSource, CanonicalEvent, Recurrence, UNTITLED_EVENT};

use crate::error::ProviderResult;
use crate::raw_event::RawEvent;

/// Converts one [`RawEvent`] into a [`CanonicalEvent`] owned by `source`.
///
/// # Errors
///
/// Returns a parse error if the event ends before it starts.
pub fn normalize_event(raw: &RawEvent, source: &CalendarSource) -> ProviderResult<CanonicalEvent> {
    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED_EVENT);

    let event = CanonicalEvent::try_new(
        &raw.id,
        title,
        raw.start,
        raw.end,
        &source.id,
        &source.color,
    )?
    .with_location(raw.location.clone().unwrap_or_default())
    .with_recurrence(Recurrence::from_flag(raw.recurs), raw.recurrence_end)
    .with_weekdays(raw.weekdays.iter().copied());

    Ok(event)
}

/// Normalizes a whole provider response.
///
/// Fails on the first malformed event; a source never yields partial results.
pub fn normalize_events(raws: &[RawEvent], source: &CalendarSource) -> ProviderResult<Vec<CanonicalEvent>> {
    raws.iter().map(|raw| normalize_event(raw, source)).collect()
}
