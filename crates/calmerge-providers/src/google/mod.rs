//! Account-based calendar provider (`google`).
//!
//! Fetches the events of one calendar of the account identified by the
//! source's bearer credential.
//!
//! # Behavior
//!
//! - Calendar locator is the source's `calendar_id`, defaulting to `primary`
//! - Recurring series are expanded server-side; an item that belongs to a
//!   series (or carries its own `recurrence`) is marked weekly
//! - Cancelled items are dropped
//! - A date-only start marks an all-day event
//!
//! # Example
//!
//! ```ignore
//! use calmerge_providers::{GoogleAdapter, ProviderSettings, SourceAdapter};
//!
//! let adapter = GoogleAdapter::new(&ProviderSettings::default())?;
//! let events = adapter.fetch(&source).await?;
//! ```

mod adapter;
mod client;

pub use adapter::GoogleAdapter;
pub use client::{DEFAULT_CALENDAR_ID, GoogleCalendarClient};
