//! Message types for the SyncController

use serde::Serialize;
use thiserror::Error;
use tokio::sync::oneshot;
use url::Url;

use crate::channel::{ChannelError, SyncEnvelope, SyncId};

/// Errors surfaced to callers of a ControllerHandle
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Controller channel closed")]
    Closed,
}

/// Result of a local publish request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published(SyncEnvelope),
    /// The current location carries no time window; nothing was written
    NothingToSync,
}

/// Requests to the controller task
#[derive(Debug)]
pub enum SyncRequest {
    /// The operator activated the sync control
    Publish {
        reply: oneshot::Sender<Result<PublishOutcome, ControllerError>>,
    },

    /// The host page moved to a new location on its own
    SetLocation { location: Url },

    /// Get counters and session state
    GetStatus { reply: oneshot::Sender<ControllerStatus> },

    /// Stop the controller
    Shutdown,
}

/// Session state and counters for observability
#[derive(Debug, Clone, Default, Serialize)]
pub struct ControllerStatus {
    pub location: String,
    #[serde(rename = "last-seen-sync-id")]
    pub last_seen_sync_id: Option<SyncId>,
    #[serde(rename = "pending-sync-id")]
    pub pending_sync_id: Option<SyncId>,
    pub published: u64,
    pub received: u64,
    pub applied: u64,
    #[serde(rename = "ignored-self")]
    pub ignored_self: u64,
    #[serde(rename = "ignored-duplicate")]
    pub ignored_duplicate: u64,
    #[serde(rename = "ignored-empty")]
    pub ignored_empty: u64,
    pub superseded: u64,
    /// Accepted envelopes written in the pre-versioned format
    #[serde(rename = "accepted-legacy")]
    pub accepted_legacy: u64,
    #[serde(rename = "apply-failures")]
    pub apply_failures: u64,
}
