//! Shared storage medium
//!
//! A [`StorageArea`] is one tab's view of a key-value store shared by every
//! tab of an origin. It behaves like a browser's local storage:
//!
//! - reads and writes replace whole values
//! - every write that changes a value notifies the *other* areas
//! - the writing area is never notified of its own write
//! - an area that is not subscribed when a write happens never sees it

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use super::error::ChannelError;

/// Identity of one area (one tab's view of the store)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(String);

impl AreaId {
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AreaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AreaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Change notification delivered to every area except the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub old_value: Option<String>,
    /// `None` when the key was removed
    pub new_value: Option<String>,
    pub writer: AreaId,
}

/// One tab's view of the shared store
pub trait StorageArea: Send + Sync {
    fn area_id(&self) -> &AreaId;

    fn get_item(&self, key: &str) -> Result<Option<String>, ChannelError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), ChannelError>;

    fn remove_item(&self, key: &str) -> Result<(), ChannelError>;

    /// Changes written by other areas from now on
    ///
    /// The subscription is taken when this is called, not when the stream is
    /// first polled.
    fn changes(&self) -> BoxStream<'static, StorageEvent>;
}
