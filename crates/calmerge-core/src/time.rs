//! Date helpers shared by the event model and the week timeline.
//!
//! Providers report times either as a full datetime or as a date-only value
//! (all-day events). [`EventTime`] keeps that distinction until the event is
//! normalized; the week helpers normalize arbitrary dates onto week anchors.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Number of days between two consecutive week anchors.
pub const DAYS_PER_WEEK: u64 = 7;

/// A start or end value as reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific instant, stored in UTC.
    DateTime(DateTime<Utc>),
    /// A calendar date without a time of day.
    Date(NaiveDate),
}

impl EventTime {
    /// Returns `true` for date-only values.
    pub fn is_date_only(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Converts to a UTC instant. Dates map to midnight UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => *dt,
            Self::Date(date) => midnight_utc(*date),
        }
    }

    /// Returns the calendar date of this value.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.date_naive(),
            Self::Date(date) => *date,
        }
    }
}

/// Midnight UTC on the given date.
pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    // `NaiveTime::MIN` is 00:00:00, always valid.
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Returns the first day of the week containing `date`.
///
/// `week_start` is the weekday a week begins on (Sunday in most locales the
/// timeline targets, Monday for ISO weeks).
pub fn week_start_of(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = days_since(date.weekday(), week_start);
    date - Days::new(u64::from(offset))
}

/// Days from `week_start` forward to `day`, in `0..7`.
fn days_since(day: Weekday, week_start: Weekday) -> u32 {
    (7 + day.num_days_from_sunday() - week_start.num_days_from_sunday()) % 7
}

/// Returns the anchor one week before `anchor`.
pub fn previous_week(anchor: NaiveDate) -> NaiveDate {
    anchor - Days::new(DAYS_PER_WEEK)
}

/// Returns the anchor one week after `anchor`.
pub fn next_week(anchor: NaiveDate) -> NaiveDate {
    anchor + Days::new(DAYS_PER_WEEK)
}

/// Returns `true` if `date` falls in the seven days starting at `anchor`.
pub fn week_contains(anchor: NaiveDate, date: NaiveDate) -> bool {
    date >= anchor && date < next_week(anchor)
}

/// Weekday index with Sunday as 0, as used by [`crate::CanonicalEvent::weekdays`].
pub fn weekday_index(day: Weekday) -> u8 {
    // num_days_from_sunday is always < 7
    day.num_days_from_sunday() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_sunday() {
        // 2025-06-19 is a Thursday
        assert_eq!(week_start_of(date(2025, 6, 19), Weekday::Sun), date(2025, 6, 15));
        assert_eq!(week_start_of(date(2025, 6, 15), Weekday::Sun), date(2025, 6, 15));
        assert_eq!(week_start_of(date(2025, 6, 21), Weekday::Sun), date(2025, 6, 15));
    }

    #[test]
    fn week_start_monday() {
        assert_eq!(week_start_of(date(2025, 6, 19), Weekday::Mon), date(2025, 6, 16));
        assert_eq!(week_start_of(date(2025, 6, 15), Weekday::Mon), date(2025, 6, 9));
    }

    #[test]
    fn week_start_crosses_year() {
        // 2025-01-01 is a Wednesday
        assert_eq!(week_start_of(date(2025, 1, 1), Weekday::Sun), date(2024, 12, 29));
    }

    #[test]
    fn neighbours_are_seven_days_apart() {
        let anchor = date(2025, 6, 15);
        assert_eq!(previous_week(anchor), date(2025, 6, 8));
        assert_eq!(next_week(anchor), date(2025, 6, 22));
    }

    #[test]
    fn contains_is_half_open() {
        let anchor = date(2025, 6, 15);
        assert!(week_contains(anchor, date(2025, 6, 15)));
        assert!(week_contains(anchor, date(2025, 6, 21)));
        assert!(!week_contains(anchor, date(2025, 6, 22)));
        assert!(!week_contains(anchor, date(2025, 6, 14)));
    }

    #[test]
    fn event_time_conversion() {
        let all_day = EventTime::Date(date(2025, 2, 10));
        assert!(all_day.is_date_only());
        assert_eq!(all_day.to_utc().to_rfc3339(), "2025-02-10T00:00:00+00:00");

        let dt = "2025-02-10T14:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let timed = EventTime::DateTime(dt);
        assert!(!timed.is_date_only());
        assert_eq!(timed.date(), date(2025, 2, 10));
    }

    #[test]
    fn weekday_indices() {
        assert_eq!(weekday_index(Weekday::Sun), 0);
        assert_eq!(weekday_index(Weekday::Thu), 4);
        assert_eq!(weekday_index(Weekday::Sat), 6);
    }
}
