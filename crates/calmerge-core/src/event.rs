//! Canonical event model.
//!
//! Every provider adapter produces [`CanonicalEvent`] values. Events are
//! rebuilt from scratch on each sync pass and never mutated across passes;
//! identity for deduplication is the [`EventKey`] pair `(source_id, id)`
//! because provider ids are only unique inside their own provider.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::EventTime;

/// Title used when a provider returns an event without one.
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// Errors raised while building a [`CanonicalEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The event ends before it starts.
    #[error("event {id} ends ({end}) before it starts ({start})")]
    NegativeDuration {
        id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Recurrence descriptor.
///
/// Providers are only decoded as far as "repeats weekly or not"; the true
/// frequency is not carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Weekly,
}

impl Recurrence {
    /// `Weekly` when `recurs` is true, `None` otherwise.
    pub fn from_flag(recurs: bool) -> Self {
        if recurs { Self::Weekly } else { Self::None }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, Self::Weekly)
    }
}

/// Composite identity of an event across all sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub source_id: String,
    pub id: String,
}

/// A provider-agnostic, normalized calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Provider-native identifier.
    pub id: String,
    pub title: String,
    /// Start instant; all-day events start at midnight UTC of their date.
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// True when the provider reported a date-only start.
    pub is_all_day: bool,
    pub recurrence: Recurrence,
    /// Last day of the series. Only meaningful when `recurrence` is weekly.
    pub recurrence_end: Option<NaiveDate>,
    /// Weekday indices (0 = Sunday). Empty when the provider does not expose them.
    pub weekdays: BTreeSet<u8>,
    /// Display color inherited from the source.
    pub color: String,
    /// Back-reference to the originating source.
    pub source_id: String,
    /// Location text, empty when unknown.
    pub location: String,
}

impl CanonicalEvent {
    /// Builds an event, rejecting one that ends before it starts.
    ///
    /// `is_all_day` follows the shape of `start`: a date-only start is an
    /// all-day event, a datetime start is not.
    pub fn try_new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: EventTime,
        end: EventTime,
        source_id: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Self, EventError> {
        let id = id.into();
        let start_utc = start.to_utc();
        let end_utc = end.to_utc();
        if end_utc < start_utc {
            return Err(EventError::NegativeDuration {
                id,
                start: start_utc,
                end: end_utc,
            });
        }

        let title = title.into();
        let title = if title.trim().is_empty() {
            UNTITLED_EVENT.to_string()
        } else {
            title
        };

        Ok(Self {
            id,
            title,
            start: start_utc,
            end: end_utc,
            is_all_day: start.is_date_only(),
            recurrence: Recurrence::None,
            recurrence_end: None,
            weekdays: BTreeSet::new(),
            color: color.into(),
            source_id: source_id.into(),
            location: String::new(),
        })
    }

    /// Returns the deduplication key.
    pub fn key(&self) -> EventKey {
        EventKey {
            source_id: self.source_id.clone(),
            id: self.id.clone(),
        }
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set recurrence. `until` is dropped for non-recurring events.
    pub fn with_recurrence(mut self, recurrence: Recurrence, until: Option<NaiveDate>) -> Self {
        self.recurrence = recurrence;
        self.recurrence_end = if recurrence.is_recurring() { until } else { None };
        self
    }

    /// Builder method to set weekday indices. Values outside `0..7` are ignored.
    pub fn with_weekdays(mut self, weekdays: impl IntoIterator<Item = u8>) -> Self {
        self.weekdays = weekdays.into_iter().filter(|d| *d < 7).collect();
        self
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Returns true if any part of the event falls on `date` (UTC).
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        let day_start = crate::time::midnight_utc(date);
        let day_end = day_start + chrono::Duration::days(1);
        if self.start == self.end {
            return self.start >= day_start && self.start < day_end;
        }
        self.start < day_end && self.end > day_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(s: &str) -> EventTime {
        EventTime::DateTime(s.parse::<DateTime<Utc>>().unwrap())
    }

    mod construction {
        use super::*;

        #[test]
        fn timed_event() {
            let event = CanonicalEvent::try_new(
                "evt-1",
                "Standup",
                at("2025-06-19T09:00:00Z"),
                at("2025-06-19T09:15:00Z"),
                "src-1",
                "#3366ff",
            )
            .unwrap();

            assert!(!event.is_all_day);
            assert_eq!(event.duration_minutes(), 15);
            assert_eq!(event.recurrence, Recurrence::None);
            assert!(event.location.is_empty());
            assert!(event.weekdays.is_empty());
            assert_eq!(event.color, "#3366ff");
        }

        #[test]
        fn date_only_start_is_all_day() {
            let event = CanonicalEvent::try_new(
                "evt-2",
                "Holiday",
                EventTime::Date(date(2025, 6, 19)),
                EventTime::Date(date(2025, 6, 20)),
                "src-1",
                "red",
            )
            .unwrap();

            assert!(event.is_all_day);
            assert_eq!(event.duration_minutes(), 24 * 60);
        }

        #[test]
        fn zero_length_is_allowed() {
            let event = CanonicalEvent::try_new(
                "evt-3",
                "Deadline",
                at("2025-06-19T23:59:00Z"),
                at("2025-06-19T23:59:00Z"),
                "src-1",
                "red",
            );
            assert!(event.is_ok());
        }

        #[test]
        fn negative_duration_rejected() {
            let err = CanonicalEvent::try_new(
                "evt-4",
                "Backwards",
                at("2025-06-19T10:00:00Z"),
                at("2025-06-19T09:00:00Z"),
                "src-1",
                "red",
            )
            .unwrap_err();

            assert!(matches!(err, EventError::NegativeDuration { ref id, .. } if id == "evt-4"));
            assert!(err.to_string().contains("evt-4"));
        }

        #[test]
        fn blank_title_defaults() {
            let event = CanonicalEvent::try_new(
                "evt-5",
                "  ",
                at("2025-06-19T10:00:00Z"),
                at("2025-06-19T11:00:00Z"),
                "src-1",
                "red",
            )
            .unwrap();
            assert_eq!(event.title, UNTITLED_EVENT);
        }
    }

    mod builders {
        use super::*;

        fn sample() -> CanonicalEvent {
            CanonicalEvent::try_new(
                "evt",
                "Lecture",
                at("2025-06-16T13:00:00Z"),
                at("2025-06-16T14:00:00Z"),
                "canvas-1",
                "orange",
            )
            .unwrap()
        }

        #[test]
        fn recurrence_end_only_kept_for_recurring() {
            let event = sample().with_recurrence(Recurrence::None, Some(date(2025, 12, 1)));
            assert!(event.recurrence_end.is_none());

            let event = sample().with_recurrence(Recurrence::Weekly, Some(date(2025, 12, 1)));
            assert!(event.recurrence.is_recurring());
            assert_eq!(event.recurrence_end, Some(date(2025, 12, 1)));
        }

        #[test]
        fn weekdays_filtered() {
            let event = sample().with_weekdays([1, 3, 9, 3]);
            assert_eq!(event.weekdays.into_iter().collect::<Vec<_>>(), vec![1, 3]);
        }

        #[test]
        fn key_is_composite() {
            let a = sample();
            let mut b = sample();
            b.source_id = "google-1".into();
            assert_ne!(a.key(), b.key());
            assert_eq!(a.key(), sample().key());
        }

        #[test]
        fn occurs_on_spans_days() {
            let event = CanonicalEvent::try_new(
                "overnight",
                "Hackathon",
                at("2025-06-16T20:00:00Z"),
                at("2025-06-17T04:00:00Z"),
                "src",
                "red",
            )
            .unwrap();
            assert!(event.occurs_on(date(2025, 6, 16)));
            assert!(event.occurs_on(date(2025, 6, 17)));
            assert!(!event.occurs_on(date(2025, 6, 18)));

            let all_day = CanonicalEvent::try_new(
                "day",
                "Holiday",
                EventTime::Date(date(2025, 6, 18)),
                EventTime::Date(date(2025, 6, 19)),
                "src",
                "red",
            )
            .unwrap();
            assert!(all_day.occurs_on(date(2025, 6, 18)));
            assert!(!all_day.occurs_on(date(2025, 6, 19)));
        }
    }

    #[test]
    fn serde_shape() {
        let event = CanonicalEvent::try_new(
            "evt",
            "Lecture",
            at("2025-06-16T13:00:00Z"),
            at("2025-06-16T14:00:00Z"),
            "canvas-1",
            "orange",
        )
        .unwrap()
        .with_recurrence(Recurrence::Weekly, None);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["recurrence"], "weekly");
        assert_eq!(json["is_all_day"], false);
        assert_eq!(json["source_id"], "canvas-1");
    }
}
