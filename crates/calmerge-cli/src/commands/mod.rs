//! Command implementations.

pub mod config;
pub mod sources;
pub mod sync;
pub mod timeline;
pub mod watch;
