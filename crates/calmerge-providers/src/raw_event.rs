//! Raw event data as extracted from a provider response.
//!
//! Each adapter maps its wire format onto [`RawEvent`]; the normalization
//! step then stamps source identity and color and validates the result.

use calmerge_core::EventTime;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Provider-agnostic event fields before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Provider-native identifier.
    pub id: String,
    /// Human title, if the provider supplied one.
    pub title: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub location: Option<String>,
    /// Whether the provider attached any recurrence metadata.
    pub recurs: bool,
    /// End of the recurring series, when the provider exposes it.
    pub recurrence_end: Option<NaiveDate>,
    /// Weekday indices (0 = Sunday) the series repeats on.
    pub weekdays: Vec<u8>,
}

impl RawEvent {
    pub fn new(id: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Self {
            id: id.into(),
            title: None,
            start,
            end,
            location: None,
            recurs: false,
            recurrence_end: None,
            weekdays: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_recurs(mut self, recurs: bool) -> Self {
        self.recurs = recurs;
        self
    }

    /// Returns true if the start is a date-only value.
    pub fn is_all_day(&self) -> bool {
        self.start.is_date_only()
    }
}
