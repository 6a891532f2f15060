//! SyncEnvelope wire format
//!
//! ```json
//! {
//!   "version": 1,
//!   "window": {"from": "100", "to": "200", "live": "false"},
//!   "syncId": "1718000000000_0.8120918463",
//!   "originTabKey": "https://app.example.com/dash?from_ts=100&to_ts=200"
//! }
//! ```
//!
//! Unknown fields are ignored so tabs running different versions can share a
//! slot. A payload without `version` is the legacy shape (`timestamp` and
//! `sourceTab` instead of `window` and `originTabKey`) and decodes as version 0.
//! Newer versions decode as long as the version 1 fields are still present;
//! incompatible changes belong under a different storage key.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::EnvelopeError;
use crate::window::TimeWindow;

/// Schema version written by this build
pub const ENVELOPE_VERSION: u32 = 1;

/// Identifier of a single publish call: `<unix-millis>_<random-fraction>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncId(String);

impl SyncId {
    /// Generate a fresh id for a publish
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let fraction: f64 = rand::random();
        Self(format!("{}_{}", millis, fraction))
    }

    /// Wrap an existing id string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Millisecond component, if the id follows the generated format
    pub fn millis(&self) -> Option<i64> {
        self.0.split_once('_').and_then(|(ms, _)| ms.parse().ok())
    }
}

impl std::fmt::Display for SyncId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The unit of cross-tab communication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEnvelope {
    /// Schema version, 0 for legacy payloads
    #[serde(default)]
    pub version: u32,

    #[serde(alias = "timestamp")]
    pub window: TimeWindow,

    pub sync_id: SyncId,

    /// Full location of the publishing tab at publish time
    #[serde(alias = "sourceTab")]
    pub origin_tab_key: String,
}

impl SyncEnvelope {
    /// Build an envelope for a new publish with a fresh sync id
    pub fn new(window: TimeWindow, origin_tab_key: impl Into<String>) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            window,
            sync_id: SyncId::generate(),
            origin_tab_key: origin_tab_key.into(),
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.version == 0
    }

    /// Serialize for the shared slot
    pub fn encode(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a payload read from the shared slot
    pub fn decode(raw: &str) -> Result<Self, EnvelopeError> {
        let envelope: Self = serde_json::from_str(raw)?;

        if envelope.sync_id.as_str().is_empty() {
            return Err(EnvelopeError::Malformed("empty syncId".to_string()));
        }
        if envelope.version > ENVELOPE_VERSION {
            debug!(
                version = envelope.version,
                supported = ENVELOPE_VERSION,
                "SyncEnvelope::decode: newer schema, reading known fields"
            );
        }

        Ok(envelope)
    }
}
