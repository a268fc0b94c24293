//! Adapter configuration.

use std::time::Duration;

use url::Url;

/// Settings shared by the HTTP-backed adapters.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base URL of the account calendar API (events live under
    /// `{base}/calendars/{id}/events`).
    pub google_api_base: Url,

    /// Base URL of the LMS instance (`{base}/api/v1/calendar_events`).
    pub canvas_base_url: Url,

    /// Per-request timeout.
    pub timeout: Duration,

    pub user_agent: String,
}

impl ProviderSettings {
    pub const DEFAULT_GOOGLE_API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";

    pub const DEFAULT_CANVAS_BASE_URL: &'static str = "https://canvas.instructure.com";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

    /// Builder: override the calendar API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_google_api_base(mut self, url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        self.google_api_base = Url::parse(url.as_ref())?;
        Ok(self)
    }

    /// Builder: override the LMS base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_canvas_base_url(mut self, url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        self.canvas_base_url = Url::parse(url.as_ref())?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Base URL as a string without a trailing slash.
    pub(crate) fn google_base(&self) -> &str {
        self.google_api_base.as_str().trim_end_matches('/')
    }

    pub(crate) fn canvas_base(&self) -> &str {
        self.canvas_base_url.as_str().trim_end_matches('/')
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            google_api_base: Url::parse(Self::DEFAULT_GOOGLE_API_BASE)
                .expect("default calendar API URL is valid"),
            canvas_base_url: Url::parse(Self::DEFAULT_CANVAS_BASE_URL)
                .expect("default LMS URL is valid"),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("calmerge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ProviderSettings::default();
        assert_eq!(settings.google_base(), "https://www.googleapis.com/calendar/v3");
        assert_eq!(settings.canvas_base(), "https://canvas.instructure.com");
        assert_eq!(settings.timeout, Duration::from_secs(20));
        assert!(settings.user_agent.starts_with("calmerge/"));
    }

    #[test]
    fn overrides_strip_trailing_slash() {
        let settings = ProviderSettings::default()
            .with_google_api_base("http://127.0.0.1:9000/")
            .unwrap()
            .with_canvas_base_url("https://school.example.edu/")
            .unwrap()
            .with_timeout(Duration::from_secs(3));

        assert_eq!(settings.google_base(), "http://127.0.0.1:9000");
        assert_eq!(settings.canvas_base(), "https://school.example.edu");
        assert_eq!(settings.timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_url_rejected() {
        assert!(
            ProviderSettings::default()
                .with_canvas_base_url("not a url")
                .is_err()
        );
    }
}
