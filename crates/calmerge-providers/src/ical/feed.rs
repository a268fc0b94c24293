//! iCalendar feed parsing.
//!
//! Parses RFC 5545 text and converts its VEVENT components to [`RawEvent`].
//! Every other component type (VTODO, VJOURNAL, VFREEBUSY) is ignored.

use calmerge_core::EventTime;
use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;

const CALENDAR_MARKER: &str = "BEGIN:VCALENDAR";

/// Rewrites `webcal://` locators to `https://`; other schemes pass through.
pub fn feed_url(locator: &str) -> String {
    let locator = locator.trim();
    match locator.get(..9) {
        Some(scheme) if scheme.eq_ignore_ascii_case("webcal://") => {
            format!("https://{}", &locator[9..])
        }
        _ => locator.to_string(),
    }
}

/// Parses a whole feed body.
///
/// # Errors
///
/// Returns a parse error if the body is not a calendar, cannot be parsed, or
/// contains a VEVENT without UID or DTSTART. No partial result is returned.
pub fn parse_feed(body: &str) -> ProviderResult<Vec<RawEvent>> {
    if !body.contains(CALENDAR_MARKER) {
        return Err(ProviderError::parse("response is not an iCalendar document"));
    }

    let calendar = body
        .parse::<Calendar>()
        .map_err(|e| ProviderError::parse(format!("failed to parse iCalendar: {}", e)))?;

    calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(parse_event(event)),
            _ => None,
        })
        .collect()
}

fn parse_event(event: &Event) -> ProviderResult<RawEvent> {
    let uid = event
        .get_uid()
        .map(str::trim)
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| ProviderError::parse("VEVENT without UID"))?;
    let start = event
        .get_start()
        .map(convert_date_time)
        .ok_or_else(|| ProviderError::parse(format!("VEVENT {} without DTSTART", uid)))?;
    let end = event.get_end().map(convert_date_time).unwrap_or(start);

    let mut raw = RawEvent::new(uid, start, end);
    if let Some(summary) = event.get_summary() {
        raw = raw.with_title(summary);
    }
    if let Some(location) = event.get_location() {
        raw = raw.with_location(location);
    }

    debug!(uid = %raw.id, start = ?raw.start, "parsed feed event");
    Ok(raw)
}

/// Floating times, and times whose TZID is not a known IANA zone, are read
/// as UTC wall time.
fn convert_date_time(dt: DatePerhapsTime) -> EventTime {
    match dt {
        DatePerhapsTime::Date(date) => EventTime::Date(date),
        DatePerhapsTime::DateTime(cdt) => EventTime::DateTime(match cdt {
            CalendarDateTime::Utc(dt) => dt,
            CalendarDateTime::Floating(naive) => Utc.from_utc_datetime(&naive),
            CalendarDateTime::WithTimezone { date_time, tzid } => zoned_to_utc(date_time, &tzid),
        }),
    }
}

fn zoned_to_utc(local: NaiveDateTime, tzid: &str) -> DateTime<Utc> {
    let Ok(tz) = tzid.trim().parse::<Tz>() else {
        debug!(tzid, "unknown TZID, reading time as UTC");
        return Utc.from_utc_datetime(&local);
    };

    // A wall time skipped by a DST jump is taken one hour later.
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + TimeDelta::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}
