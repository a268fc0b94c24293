//! LMS calendar provider (`canvas`).
//!
//! Lists `/api/v1/calendar_events` with the source's bearer token, optionally
//! narrowed to the context code in `calendar_id`, and follows `Link`
//! pagination. Items without a start are skipped; a missing end collapses to
//! the start. Events from this provider are never all-day.

mod adapter;
mod client;

pub use adapter::CanvasAdapter;
pub use client::CanvasClient;
