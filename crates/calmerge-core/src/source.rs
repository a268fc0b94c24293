//! Calendar source definitions.
//!
//! A [`CalendarSource`] is a linked account or feed: which provider to talk
//! to, which credential to present and which calendar to read. The serialized
//! form is the record shape used by the source store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The provider behind a calendar source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Account-based calendar API (OAuth bearer token).
    Google,
    /// LMS calendar reachable with a personal access token.
    Canvas,
    /// Public or secret iCalendar feed URL.
    Ical,
    Blackboard,
    Gclassroom,
    Supabase,
    Todowork,
}

impl SourceKind {
    /// All declared provider kinds, including those without an adapter.
    pub const ALL: [SourceKind; 7] = [
        Self::Google,
        Self::Canvas,
        Self::Ical,
        Self::Blackboard,
        Self::Gclassroom,
        Self::Supabase,
        Self::Todowork,
    ];

    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Canvas => "canvas",
            Self::Ical => "ical",
            Self::Blackboard => "blackboard",
            Self::Gclassroom => "gclassroom",
            Self::Supabase => "supabase",
            Self::Todowork => "todowork",
        }
    }

    /// Returns `true` if sources of this kind need an `auth_token`.
    pub fn requires_token(&self) -> bool {
        matches!(self, Self::Google | Self::Canvas)
    }

    /// Returns `true` if sources of this kind need a `calendar_id`.
    pub fn requires_calendar_id(&self) -> bool {
        matches!(self, Self::Ical)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown source type: {}", s))
    }
}

/// A configured external calendar account or feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSource {
    /// Unique identifier of the source.
    pub id: String,
    /// The account that owns this source.
    #[serde(default)]
    pub owner_id: String,
    /// Provider variant.
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Display name.
    pub name: String,
    /// Display color tag copied onto every event from this source.
    pub color: String,
    /// Disabled sources are skipped by sync.
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    /// Bearer credential for token-based providers.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Provider-specific locator (calendar id, feed URL, context code).
    #[serde(default)]
    pub calendar_id: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl CalendarSource {
    /// Creates an enabled source with no credential or locator.
    pub fn new(
        id: impl Into<String>,
        kind: SourceKind,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: String::new(),
            kind,
            name: name.into(),
            color: color.into(),
            is_enabled: true,
            auth_token: None,
            calendar_id: None,
        }
    }

    /// Builder: set the owning account.
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    /// Builder: set the bearer credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Builder: set the provider locator.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = Some(calendar_id.into());
        self
    }

    /// Builder: set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.is_enabled = enabled;
        self
    }

    /// The credential, if present and not blank.
    pub fn token(&self) -> Option<&str> {
        non_blank(self.auth_token.as_deref())
    }

    /// The locator, if present and not blank.
    pub fn locator(&self) -> Option<&str> {
        non_blank(self.calendar_id.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
