//! Engine configuration.
//!
//! File layer (toml) under environment overrides, with warn-and-default
//! recovery: a broken config file never blocks session start.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::identity::UserId;

const DEFAULT_DEBOUNCE_MS: u64 = 1_000;
const DEFAULT_MAX_INTERVAL_MS: u64 = 5_000;
const DEFAULT_CACHE_KEY_PREFIX: &str = "navsync";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Quiet interval before the coalesced remote save fires.
    pub debounce_ms: u64,
    /// Upper bound on how long a constant edit stream can defer the save.
    pub max_interval_ms: u64,
    /// Prefix for the scoped device-cache key.
    pub cache_key_prefix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_interval_ms: DEFAULT_MAX_INTERVAL_MS,
            cache_key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_string(),
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms.max(self.debounce_ms))
    }

    /// Device-cache key, scoped per user.
    pub fn cache_key(&self, user: Option<&UserId>) -> String {
        match user {
            Some(user) => format!("{}.nav.{user}", self.cache_key_prefix),
            None => format!("{}.nav.anonymous", self.cache_key_prefix),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Missing file means defaults; unreadable or malformed falls back
    /// to defaults with a warning. Environment overrides apply last.
    pub fn load_or_default(path: &Path) -> Self {
        let mut config = if path.exists() {
            match Self::load(path) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(error = %err, "config load failed, using defaults");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        apply_env_overrides(&mut config);
        config
    }
}

fn apply_env_overrides(config: &mut SyncConfig) {
    if let Some(value) = env_u64("NAVSYNC_DEBOUNCE_MS") {
        config.debounce_ms = value;
    }
    if let Some(value) = env_u64("NAVSYNC_MAX_INTERVAL_MS") {
        config.max_interval_ms = value;
    }
    if let Ok(prefix) = std::env::var("NAVSYNC_CACHE_KEY_PREFIX") {
        if !prefix.trim().is_empty() {
            config.cache_key_prefix = prefix;
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_intervals() {
        let config = SyncConfig::default();
        assert_eq!(config.debounce(), Duration::from_secs(1));
        assert_eq!(config.max_interval(), Duration::from_secs(5));
    }

    #[test]
    fn max_interval_never_undercuts_debounce() {
        let config = SyncConfig {
            debounce_ms: 2_000,
            max_interval_ms: 500,
            ..SyncConfig::default()
        };
        assert_eq!(config.max_interval(), Duration::from_millis(2_000));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = SyncConfig {
            debounce_ms: 250,
            max_interval_ms: 1_500,
            cache_key_prefix: "console".to_string(),
        };
        let rendered = toml::to_string(&config).expect("render");
        let parsed: SyncConfig = toml::from_str(&rendered).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn load_or_default_survives_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("navsync.toml");
        std::fs::write(&path, "debounce_ms = \"soon\"").expect("write");

        let config = SyncConfig::load_or_default(&path);
        assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn missing_file_is_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SyncConfig::load_or_default(&dir.path().join("absent.toml"));
        assert_eq!(config.cache_key_prefix, DEFAULT_CACHE_KEY_PREFIX);
    }
}
