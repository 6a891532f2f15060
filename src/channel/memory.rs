//! In-process shared store
//!
//! Any number of [`MemoryArea`]s opened from one [`MemoryStore`] behave like
//! tabs of the same origin. Notifications fan out over a tokio broadcast
//! channel; a subscriber that falls behind skips what it missed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::error::ChannelError;
use super::store::{AreaId, StorageArea, StorageEvent};

/// Default notification buffer per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

struct Inner {
    items: Mutex<HashMap<String, String>>,
    tx: broadcast::Sender<StorageEvent>,
}

/// Store shared by every area opened from it
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        debug!(capacity, "MemoryStore::new: creating store");
        let (tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(Inner {
                items: Mutex::new(HashMap::new()),
                tx,
            }),
        }
    }

    /// Open a new area, i.e. a new tab's view of this store
    pub fn area(&self) -> MemoryArea {
        let area = MemoryArea {
            id: AreaId::new(),
            store: self.clone(),
        };
        debug!(area_id = %area.id, "MemoryStore::area: opened");
        area
    }

    fn write(&self, writer: &AreaId, key: &str, value: Option<&str>) -> Result<(), ChannelError> {
        let mut items = self
            .inner
            .items
            .lock()
            .map_err(|_| ChannelError::Store("memory store lock poisoned".to_string()))?;

        let old_value = match value {
            Some(v) => items.insert(key.to_string(), v.to_string()),
            None => items.remove(key),
        };

        if old_value.as_deref() == value {
            debug!(%key, "MemoryStore::write: unchanged, no notification");
            return Ok(());
        }

        // Sent under the lock so notification order matches write order
        let _ = self.inner.tx.send(StorageEvent {
            key: key.to_string(),
            old_value,
            new_value: value.map(str::to_string),
            writer: writer.clone(),
        });
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// One tab's view of a [`MemoryStore`]
#[derive(Clone)]
pub struct MemoryArea {
    id: AreaId,
    store: MemoryStore,
}

impl StorageArea for MemoryArea {
    fn area_id(&self) -> &AreaId {
        &self.id
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, ChannelError> {
        let items = self
            .store
            .inner
            .items
            .lock()
            .map_err(|_| ChannelError::Store("memory store lock poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ChannelError> {
        debug!(area_id = %self.id, %key, "MemoryArea::set_item: called");
        self.store.write(&self.id, key, Some(value))
    }

    fn remove_item(&self, key: &str) -> Result<(), ChannelError> {
        debug!(area_id = %self.id, %key, "MemoryArea::remove_item: called");
        self.store.write(&self.id, key, None)
    }

    fn changes(&self) -> BoxStream<'static, StorageEvent> {
        let rx = self.store.inner.tx.subscribe();
        let own = self.id.clone();
        debug!(area_id = %own, "MemoryArea::changes: subscribed");

        stream::unfold((rx, own), |(mut rx, own)| async move {
            loop {
                match rx.recv().await {
                    Ok(event) if event.writer == own => continue,
                    Ok(event) => return Some((event, (rx, own))),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(area_id = %own, skipped, "MemoryArea::changes: subscriber lagged, notifications dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_other_area_sees_write() {
        let store = MemoryStore::new();
        let writer = store.area();
        let reader = store.area();
        let mut changes = reader.changes();

        writer.set_item("k", "v1").unwrap();

        let event = changes.next().await.unwrap();
        assert_eq!(event.key, "k");
        assert_eq!(event.old_value, None);
        assert_eq!(event.new_value.as_deref(), Some("v1"));
        assert_eq!(&event.writer, writer.area_id());
        assert_eq!(reader.get_item("k").unwrap().as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_writer_is_not_notified() {
        let store = MemoryStore::new();
        let area = store.area();
        let other = store.area();
        let mut own_changes = area.changes();

        area.set_item("k", "mine").unwrap();
        other.set_item("k", "theirs").unwrap();

        let event = own_changes.next().await.unwrap();
        assert_eq!(event.new_value.as_deref(), Some("theirs"));
        assert_eq!(event.old_value.as_deref(), Some("mine"));
    }

    #[tokio::test]
    async fn test_unchanged_write_is_silent() {
        let store = MemoryStore::new();
        let writer = store.area();
        let reader = store.area();
        let mut changes = reader.changes();

        writer.set_item("k", "same").unwrap();
        writer.set_item("k", "same").unwrap();
        writer.remove_item("k").unwrap();

        assert_eq!(changes.next().await.unwrap().new_value.as_deref(), Some("same"));
        let removal = changes.next().await.unwrap();
        assert_eq!(removal.new_value, None);
        assert_eq!(removal.old_value.as_deref(), Some("same"));
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_no_backlog() {
        let store = MemoryStore::new();
        let writer = store.area();
        let late = store.area();

        writer.set_item("k", "early").unwrap();
        let mut changes = late.changes();
        writer.set_item("k", "later").unwrap();

        assert_eq!(changes.next().await.unwrap().new_value.as_deref(), Some("later"));
        assert_eq!(late.get_item("k").unwrap().as_deref(), Some("later"));
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_latest() {
        let store = MemoryStore::with_capacity(2);
        let writer = store.area();
        let reader = store.area();
        let mut changes = reader.changes();

        for i in 0..5 {
            writer.set_item("k", &format!("v{}", i)).unwrap();
        }

        let mut last = None;
        while let Ok(Some(event)) =
            tokio::time::timeout(std::time::Duration::from_millis(50), changes.next()).await
        {
            last = event.new_value;
        }
        assert_eq!(last.as_deref(), Some("v4"));
    }
}
