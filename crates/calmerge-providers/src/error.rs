//! Error types for source adapter operations.
//!
//! Adapters report detailed [`ProviderErrorCode`]s; callers that only need
//! the coarse taxonomy (auth, network, parse, unsupported) use
//! [`ProviderErrorCode::kind`].

use std::fmt;

use calmerge_core::{EventError, SourceKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Detailed classification of an adapter failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Credential missing, invalid or expired (401).
    AuthenticationFailed,
    /// Credential valid but not allowed to read the calendar (403).
    AuthorizationFailed,
    /// Transport failure: connection, DNS, TLS, timeout.
    NetworkError,
    /// Too many requests (429).
    RateLimited,
    /// Any other non-success HTTP status.
    ServerError,
    /// Response body is not in the expected shape.
    InvalidResponse,
    /// Source type has no adapter.
    UnsupportedProvider,
}

/// Coarse failure class surfaced per source by the sync orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Auth,
    Network,
    Parse,
    Unsupported,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth_error",
            Self::Network => "network_error",
            Self::Parse => "parse_error",
            Self::Unsupported => "unsupported_provider",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProviderErrorCode {
    /// Returns true if retrying later may succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Maps the detailed code onto the coarse taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::AuthenticationFailed | Self::AuthorizationFailed => FailureKind::Auth,
            Self::NetworkError | Self::RateLimited | Self::ServerError => FailureKind::Network,
            Self::InvalidResponse => FailureKind::Parse,
            Self::UnsupportedProvider => FailureKind::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::UnsupportedProvider => "unsupported_provider",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while fetching from a calendar source.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// Adapter that produced the error ("google", "canvas", "ical").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthorizationFailed, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RateLimited, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    /// Response body did not have the expected shape.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// No adapter exists for this source type.
    pub fn unsupported(kind: SourceKind) -> Self {
        Self::new(
            ProviderErrorCode::UnsupportedProvider,
            format!("unsupported provider: {}", kind),
        )
        .with_provider(kind.as_str())
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Coarse failure class.
    pub fn kind(&self) -> FailureKind {
        self.code.kind()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Malformed provider data is a parse failure at the adapter boundary.
impl From<EventError> for ProviderError {
    fn from(err: EventError) -> Self {
        Self::parse(err.to_string()).with_source(err)
    }
}

/// A specialized Result type for adapter operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
