//! CLI, configuration, credential references, command implementations
//!
//! This crate provides the `calmerge` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
