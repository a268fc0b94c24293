//! Source adapters for calendar providers.
//!
//! This crate turns one [`CalendarSource`](calmerge_core::CalendarSource)
//! into a list of [`CanonicalEvent`](calmerge_core::CanonicalEvent)s:
//!
//! - [`SourceAdapter`] - The trait every provider implements
//! - [`AdapterRegistry`] - Maps a source type onto its adapter
//! - [`RawEvent`] - Provider fields before normalization
//! - [`normalize_event`] - Stamps source identity and validates the event
//! - [`ProviderError`] - Failure taxonomy (auth, network, parse, unsupported)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │ Calendar API │  │   LMS API    │  │  .ics feed   │
//! └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!        ▼                 ▼                 ▼
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │GoogleAdapter │  │CanvasAdapter │  │ IcalAdapter  │
//! └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!        └─────────────────┼─────────────────┘
//!                          ▼
//!                   ┌─────────────┐
//!                   │  RawEvent   │
//!                   └──────┬──────┘
//!                          ▼ normalize_event()
//!                  ┌────────────────┐
//!                  │ CanonicalEvent │
//!                  └────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calmerge_providers::{AdapterRegistry, ProviderSettings};
//!
//! let registry = AdapterRegistry::new(&ProviderSettings::default())?;
//! let adapter = registry.resolve(source.kind)?;
//! let events = adapter.fetch(&source).await?;
//! ```

pub mod adapter;
pub mod canvas;
pub mod config;
pub mod error;
pub mod google;
mod http;
pub mod ical;
pub mod normalize;
pub mod raw_event;
pub mod registry;
mod rrule;

// Re-export main types at crate root
pub use adapter::{BoxFuture, SourceAdapter, precondition_met};
pub use canvas::CanvasAdapter;
pub use config::ProviderSettings;
pub use error::{FailureKind, ProviderError, ProviderErrorCode, ProviderResult};
pub use google::GoogleAdapter;
pub use ical::IcalAdapter;
pub use normalize::{normalize_event, normalize_events};
pub use raw_event::RawEvent;
pub use registry::AdapterRegistry;
