//! Core types: canonical events, calendar sources, week timeline

pub mod event;
pub mod source;
pub mod time;
pub mod timeline;
pub mod tracing;

pub use event::{CanonicalEvent, EventError, EventKey, Recurrence, UNTITLED_EVENT};
pub use source::{CalendarSource, SourceKind};
pub use time::{EventTime, week_start_of, weekday_index};
pub use timeline::{NavigationError, ScrollOutcome, TimelineWindow};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
