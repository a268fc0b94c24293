//! Command-line interface definition.

use std::path::PathBuf;

use calmerge_core::SourceKind;
use clap::{Parser, Subcommand};

/// calmerge - one timeline for all your calendars
#[derive(Debug, Parser)]
#[command(name = "calmerge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALMERGE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every enabled source once and print the merged events
    Sync {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Sync periodically until interrupted
    Watch {
        /// Override the configured interval, in seconds
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Manage calendar sources
    Sources {
        #[command(subcommand)]
        action: SourcesAction,
    },

    /// Preview the week timeline window
    Timeline {
        /// Reference date (YYYY-MM-DD); today when missing or invalid
        #[arg(long)]
        date: Option<String>,

        /// Settle the scroll on these anchor indices, in order (can be repeated)
        #[arg(long, action = clap::ArgAction::Append)]
        scroll: Vec<usize>,

        /// Jump to the week containing this date after scrolling
        #[arg(long)]
        jump: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Source management actions.
#[derive(Debug, Subcommand)]
pub enum SourcesAction {
    /// List the owner's sources
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Add a source, or replace the one with the same id
    Add {
        /// Unique source id
        id: String,

        /// Provider type (google, canvas, ical, ...)
        #[arg(long = "type")]
        kind: SourceKind,

        /// Display name
        #[arg(long)]
        name: String,

        /// Display color tag
        #[arg(long, default_value = "blue")]
        color: String,

        /// Bearer token, or a reference (`env::VAR`, `pass::path`)
        #[arg(long)]
        token: Option<String>,

        /// Calendar id, feed URL or context code
        #[arg(long)]
        calendar_id: Option<String>,

        /// Store the source disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Include a source in sync passes
    Enable { id: String },

    /// Exclude a source from sync passes
    Disable { id: String },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration and store file paths
    Path,
}
