use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::{CONFIG_NAMESPACE, ConfigSource, LAST_MODIFIED_KEY, TIMEZONE_KEY, ZONE_NAME_KEY};

/// Label used when nothing is configured
pub const DEFAULT_LAST_MODIFIED: &str = "@last-modified";

/// Quiet period before a changed file counts as saved
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Settings for the header field itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopperConfig {
    /// Label preceding the timestamp, e.g. `@last-modified`
    pub last_modified: String,
    /// IANA zone for rendering. Unset means `$TZ`, then the system zone.
    pub timezone: Option<String>,
    /// Display name written between the parentheses
    pub zone_name: Option<String>,
}

impl Default for TopperConfig {
    fn default() -> Self {
        Self {
            last_modified: DEFAULT_LAST_MODIFIED.to_string(),
            timezone: None,
            zone_name: None,
        }
    }
}

/// Settings for the filesystem watcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub recursive: bool,
    /// Extensions to watch in addition to the known source languages
    pub extensions: Vec<String>,
    /// Milliseconds a file must stay unchanged before its save is handled
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            extensions: Vec::new(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub topper: TopperConfig,
    pub watch: WatchConfig,
}

impl AppConfig {
    /// Load from a TOML file; a missing file yields the defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

impl ConfigSource for AppConfig {
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        if namespace != CONFIG_NAMESPACE {
            return None;
        }
        match key {
            LAST_MODIFIED_KEY => Some(self.topper.last_modified.clone()),
            TIMEZONE_KEY => self.topper.timezone.clone(),
            ZONE_NAME_KEY => self.topper.zone_name.clone(),
            _ => None,
        }
    }
}
