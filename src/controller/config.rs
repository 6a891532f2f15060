//! Controller configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and buffering for a tab's SyncController
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Delay between showing the syncing banner and navigating, in milliseconds
    #[serde(rename = "apply-delay-ms", default = "default_apply_delay_ms")]
    pub apply_delay_ms: u64,

    /// How long the "synced" confirmation stays before reverting to idle
    #[serde(rename = "confirm-revert-ms", default = "default_confirm_revert_ms")]
    pub confirm_revert_ms: u64,

    /// How long the receiving-side syncing banner stays up
    #[serde(rename = "banner-ms", default = "default_banner_ms")]
    pub banner_ms: u64,

    /// Channel buffer size for controller requests
    #[serde(rename = "channel-buffer", default = "default_channel_buffer")]
    pub channel_buffer: usize,
}

fn default_apply_delay_ms() -> u64 {
    500
}

fn default_confirm_revert_ms() -> u64 {
    2000
}

fn default_banner_ms() -> u64 {
    2000
}

fn default_channel_buffer() -> usize {
    32
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            apply_delay_ms: default_apply_delay_ms(),
            confirm_revert_ms: default_confirm_revert_ms(),
            banner_ms: default_banner_ms(),
            channel_buffer: default_channel_buffer(),
        }
    }
}

impl ControllerConfig {
    pub fn apply_delay(&self) -> Duration {
        Duration::from_millis(self.apply_delay_ms)
    }

    pub fn confirm_revert(&self) -> Duration {
        Duration::from_millis(self.confirm_revert_ms)
    }

    pub fn banner(&self) -> Duration {
        Duration::from_millis(self.banner_ms)
    }
}
