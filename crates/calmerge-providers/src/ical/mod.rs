//! iCalendar feed provider (`ical`).
//!
//! The source's `calendar_id` is a feed URL (`https://`, `http://` or
//! `webcal://`). The whole feed is downloaded and parsed on every sync.

mod adapter;
mod feed;

pub use adapter::IcalAdapter;
pub use feed::{feed_url, parse_feed};
