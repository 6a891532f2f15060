//! SyncChannel - publishes and receives envelopes through one storage key

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::envelope::SyncEnvelope;
use super::error::ChannelError;
use super::store::{AreaId, StorageArea};
use crate::window::TimeWindow;

/// Storage key used by every tab unless configured otherwise
pub const DEFAULT_CHANNEL_KEY: &str = "dd-timestamp-sync";

/// Last-write-wins broadcast of time windows over a single storage key
///
/// Delivery is fire-and-forget and at most once per listening tab: no
/// acknowledgement, no retry, and no backlog for tabs that were not listening.
#[derive(Clone)]
pub struct SyncChannel {
    area: Arc<dyn StorageArea>,
    key: String,
}

impl SyncChannel {
    pub fn new(area: Arc<dyn StorageArea>, key: impl Into<String>) -> Self {
        let key = key.into();
        debug!(area_id = %area.area_id(), %key, "SyncChannel::new: called");
        Self { area, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn area_id(&self) -> &AreaId {
        self.area.area_id()
    }

    /// Broadcast `window` to every other listening tab, replacing whatever the slot held
    pub fn publish(&self, window: &TimeWindow, origin_tab_key: &str) -> Result<SyncEnvelope, ChannelError> {
        if window.is_empty() {
            return Err(ChannelError::EmptyWindow);
        }

        let envelope = SyncEnvelope::new(window.clone(), origin_tab_key);
        let payload = envelope.encode()?;
        self.area.set_item(&self.key, &payload)?;

        info!(
            key = %self.key,
            sync_id = %envelope.sync_id,
            %window,
            "SyncChannel::publish: broadcast"
        );
        Ok(envelope)
    }

    /// The envelope currently in the slot, if any
    pub fn latest(&self) -> Result<Option<SyncEnvelope>, ChannelError> {
        match self.area.get_item(&self.key)? {
            Some(raw) => Ok(Some(SyncEnvelope::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Empty the slot; listeners see a removal, which they ignore
    pub fn clear(&self) -> Result<(), ChannelError> {
        debug!(key = %self.key, "SyncChannel::clear: called");
        self.area.remove_item(&self.key)
    }

    /// Envelopes written by other tabs from now on
    ///
    /// Removals, other keys and payloads that fail to decode are dropped here.
    pub fn remote_envelopes(&self) -> BoxStream<'static, SyncEnvelope> {
        let key = self.key.clone();
        self.area
            .changes()
            .filter_map(move |event| {
                let envelope = if event.key != key {
                    None
                } else {
                    match event.new_value.as_deref().map(SyncEnvelope::decode) {
                        Some(Ok(envelope)) => Some(envelope),
                        Some(Err(e)) => {
                            debug!(writer = %event.writer, error = %e, "SyncChannel: ignoring malformed envelope");
                            None
                        }
                        None => None,
                    }
                };
                futures::future::ready(envelope)
            })
            .boxed()
    }

    /// Invoke `handler` for every envelope written by another tab
    ///
    /// The listener runs on its own task until the store goes away or the
    /// returned handle is aborted.
    pub fn on_remote<F>(&self, mut handler: F) -> JoinHandle<()>
    where
        F: FnMut(SyncEnvelope) + Send + 'static,
    {
        let mut envelopes = self.remote_envelopes();
        tokio::spawn(async move {
            while let Some(envelope) = envelopes.next().await {
                handler(envelope);
            }
            debug!("SyncChannel::on_remote: listener finished");
        })
    }
}
