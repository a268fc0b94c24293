//! Minimal RRULE field extraction.
//!
//! Recurrence is modelled as `none | weekly` only, so the full rule is never
//! expanded. The series end and the BYDAY weekdays are lifted when present.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static UNTIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)UNTIL=(\d{8})").expect("Invalid UNTIL regex"));

static BYDAY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)BYDAY=([A-Z0-9,+\-]+)").expect("Invalid BYDAY regex"));

/// Returns the date part of the rule's `UNTIL`, if any.
pub(crate) fn until_date(rule: &str) -> Option<NaiveDate> {
    let caps = UNTIL_REGEX.captures(rule)?;
    NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok()
}

/// Returns the weekday indices (0 = Sunday) named by `BYDAY`.
///
/// Ordinal prefixes such as `2MO` are ignored; the weekday still counts.
pub(crate) fn weekdays(rule: &str) -> Vec<u8> {
    let Some(caps) = BYDAY_REGEX.captures(rule) else {
        return Vec::new();
    };

    caps[1]
        .split(',')
        .filter_map(|day| {
            let code = day.trim_start_matches(|c: char| c.is_ascii_digit() || c == '+' || c == '-');
            match code.to_ascii_uppercase().as_str() {
                "SU" => Some(0),
                "MO" => Some(1),
                "TU" => Some(2),
                "WE" => Some(3),
                "TH" => Some(4),
                "FR" => Some(5),
                "SA" => Some(6),
                _ => None,
            }
        })
        .collect()
}
