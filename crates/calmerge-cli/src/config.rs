//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calmerge/config.toml` by default. Every section is optional;
//! missing values fall back to the library defaults.
//!
//! ```toml
//! owner_id = "me"
//! store_path = "/home/me/.local/share/calmerge/sources.json"
//!
//! [providers]
//! canvas_base_url = "https://school.instructure.com"
//! timeout_secs = 20
//!
//! [sync]
//! source_timeout_secs = 30
//! interval_secs = 300
//!
//! [timeline]
//! week_start = "monday"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use calmerge_providers::ProviderSettings;
use calmerge_sync::{SchedulerConfig, SyncConfig};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Owner used when the config does not name one.
pub const DEFAULT_OWNER: &str = "local";

/// Configuration for the calmerge client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Owner whose sources are loaded and created.
    pub owner_id: String,

    /// Source store file. Defaults to the data directory.
    pub store_path: Option<PathBuf>,

    pub providers: ProviderSection,

    pub sync: SyncSection,

    pub timeline: TimelineSection,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            owner_id: DEFAULT_OWNER.to_string(),
            store_path: None,
            providers: ProviderSection::default(),
            sync: SyncSection::default(),
            timeline: TimelineSection::default(),
        }
    }
}

/// Provider endpoints and HTTP settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub google_api_base: Option<String>,
    pub canvas_base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

/// Sync pass and watch loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    /// Upper bound on one source's fetch.
    pub source_timeout_secs: u64,
    /// Interval between passes in `watch` mode.
    pub interval_secs: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            source_timeout_secs: SyncConfig::DEFAULT_SOURCE_TIMEOUT_SECS,
            interval_secs: 300,
        }
    }
}

/// First day of the displayed week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSection {
    pub week_start: WeekStart,
    /// Cap on the number of week anchors kept while scrolling.
    pub max_anchors: Option<usize>,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calmerge")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calmerge")
    }

    /// Source store file, explicit or default.
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("sources.json"))
    }

    /// Builds adapter settings, validating any URL overrides.
    pub fn provider_settings(&self) -> ClientResult<ProviderSettings> {
        let section = &self.providers;
        let mut settings = ProviderSettings::default();

        if let Some(ref url) = section.google_api_base {
            settings = settings
                .with_google_api_base(url)
                .map_err(|e| ClientError::Config(format!("invalid google_api_base: {}", e)))?;
        }
        if let Some(ref url) = section.canvas_base_url {
            settings = settings
                .with_canvas_base_url(url)
                .map_err(|e| ClientError::Config(format!("invalid canvas_base_url: {}", e)))?;
        }
        if let Some(secs) = section.timeout_secs {
            if secs == 0 {
                return Err(ClientError::Config(
                    "providers.timeout_secs must be greater than zero".into(),
                ));
            }
            settings = settings.with_timeout(Duration::from_secs(secs));
        }
        if let Some(ref agent) = section.user_agent {
            settings = settings.with_user_agent(agent);
        }

        Ok(settings)
    }

    pub fn sync_config(&self) -> ClientResult<SyncConfig> {
        let config = SyncConfig::new(Duration::from_secs(self.sync.source_timeout_secs));
        config
            .validate()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn scheduler_config(&self) -> ClientResult<SchedulerConfig> {
        if self.sync.interval_secs == 0 {
            return Err(ClientError::Config(
                "sync.interval_secs must be greater than zero".into(),
            ));
        }
        Ok(SchedulerConfig::new(Duration::from_secs(
            self.sync.interval_secs,
        )))
    }

    /// Runs every conversion once so errors surface before any command runs.
    pub fn validate(&self) -> ClientResult<()> {
        if self.owner_id.trim().is_empty() {
            return Err(ClientError::Config("owner_id must not be empty".into()));
        }
        self.provider_settings()?;
        self.sync_config()?;
        self.scheduler_config()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();

        assert_eq!(config.owner_id, DEFAULT_OWNER);
        assert_eq!(config.sync.source_timeout_secs, 30);
        assert_eq!(config.timeline.week_start, WeekStart::Sunday);
        assert!(config.store_path().ends_with("calmerge/sources.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_file_parses() {
        let config: ClientConfig = toml::from_str(
            r#"
owner_id = "user-7"
store_path = "/tmp/calmerge-test/sources.json"

[providers]
google_api_base = "http://127.0.0.1:9000/"
canvas_base_url = "https://school.example.edu"
timeout_secs = 5
user_agent = "test-agent"

[sync]
source_timeout_secs = 12
interval_secs = 60

[timeline]
week_start = "monday"
max_anchors = 12
"#,
        )
        .unwrap();

        assert_eq!(config.owner_id, "user-7");
        assert_eq!(
            config.store_path(),
            PathBuf::from("/tmp/calmerge-test/sources.json")
        );
        assert_eq!(config.timeline.week_start.weekday(), Weekday::Mon);
        assert_eq!(config.timeline.max_anchors, Some(12));

        let settings = config.provider_settings().unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.user_agent, "test-agent");
        assert_eq!(settings.google_api_base.as_str(), "http://127.0.0.1:9000/");

        assert_eq!(
            config.sync_config().unwrap().source_timeout,
            Duration::from_secs(12)
        );
        assert_eq!(
            config.scheduler_config().unwrap().sync_interval,
            Duration::from_secs(60)
        );
    }

    #[test]
    fn invalid_values_rejected() {
        let bad_url: ClientConfig =
            toml::from_str("[providers]\ncanvas_base_url = \"not a url\"\n").unwrap();
        assert!(matches!(
            bad_url.provider_settings(),
            Err(ClientError::Config(_))
        ));

        let zero: ClientConfig = toml::from_str("[sync]\nsource_timeout_secs = 0\n").unwrap();
        assert!(zero.validate().is_err());

        let bad_week = toml::from_str::<ClientConfig>("[timeline]\nweek_start = \"friday\"\n");
        assert!(bad_week.is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "owner_id = \"from-file\"\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.owner_id, "from-file");

        let missing = ClientConfig::load_from(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ClientError::Config(_))));
    }

    #[test]
    fn dump_round_trips() {
        let config = ClientConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.owner_id, config.owner_id);
        assert_eq!(back.sync.interval_secs, config.sync.interval_secs);
    }
}
