//! TabSync configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::channel::DEFAULT_CHANNEL_KEY;
use crate::controller::ControllerConfig;

/// Main TabSync configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shared slot configuration
    pub channel: ChannelConfig,

    /// Controller timing
    pub timing: ControllerConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tabsync.yml
        let local_config = PathBuf::from(".tabsync.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tabsync/tabsync.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tabsync").join("tabsync.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Shared slot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Store key holding the latest envelope
    pub key: String,

    /// Directory backing the cross-process file store
    #[serde(rename = "store-dir")]
    pub store_dir: PathBuf,

    /// How often file store listeners look for changes, in milliseconds
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        // Use XDG local data directory (~/.local/share/tabsync on Linux)
        let store_dir = dirs::data_local_dir()
            .map(|d| d.join("tabsync").join("store"))
            .unwrap_or_else(|| PathBuf::from(".tabsync-store"));

        Self {
            key: DEFAULT_CHANNEL_KEY.to_string(),
            store_dir,
            poll_interval_ms: 100,
        }
    }
}

impl ChannelConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.channel.key, "dd-timestamp-sync");
        assert_eq!(config.channel.poll_interval_ms, 100);
        assert!(config.channel.store_dir.ends_with("store"));
        assert_eq!(config.timing.apply_delay_ms, 500);
        assert_eq!(config.timing.banner_ms, 2000);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
channel:
  key: team-sync
  store-dir: /tmp/tabsync-test
  poll-interval-ms: 25

timing:
  apply-delay-ms: 100
  confirm-revert-ms: 1000
  banner-ms: 750
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.channel.key, "team-sync");
        assert_eq!(config.channel.store_dir, PathBuf::from("/tmp/tabsync-test"));
        assert_eq!(config.channel.poll_interval(), Duration::from_millis(25));
        assert_eq!(config.timing.apply_delay_ms, 100);
        assert_eq!(config.timing.confirm_revert_ms, 1000);
        assert_eq!(config.timing.banner_ms, 750);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
timing:
  apply-delay-ms: 0
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.timing.apply_delay_ms, 0);

        // Defaults for unspecified
        assert_eq!(config.timing.confirm_revert_ms, 2000);
        assert_eq!(config.channel.key, "dd-timestamp-sync");
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tabsync.yml");
        fs::write(&path, "channel:\n  key: from-file\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.channel.key, "from-file");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yml");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yml");
        fs::write(&path, "timing:\n  apply-delay-ms: [not, a, number]\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }
}
