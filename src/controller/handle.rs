//! ControllerHandle - client interface for a tab's SyncController

use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use url::Url;

use super::messages::{ControllerError, ControllerStatus, PublishOutcome, SyncRequest};

/// Handle to a running SyncController
///
/// Cloneable; the host page's control activation and location changes are
/// forwarded through it.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<SyncRequest>,
}

impl ControllerHandle {
    pub(crate) fn new(tx: mpsc::Sender<SyncRequest>) -> Self {
        Self { tx }
    }

    /// Broadcast the current location's time window to every other tab
    pub async fn publish(&self) -> Result<PublishOutcome, ControllerError> {
        debug!("ControllerHandle::publish: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SyncRequest::Publish { reply: reply_tx })
            .await
            .map_err(|_| ControllerError::Closed)?;
        reply_rx.await.map_err(|_| ControllerError::Closed)?
    }

    /// Tell the controller the tab moved to `location` on its own
    pub async fn set_location(&self, location: Url) -> Result<(), ControllerError> {
        debug!(%location, "ControllerHandle::set_location: called");
        self.tx
            .send(SyncRequest::SetLocation { location })
            .await
            .map_err(|_| ControllerError::Closed)
    }

    /// Current counters and session state
    pub async fn status(&self) -> Result<ControllerStatus, ControllerError> {
        debug!("ControllerHandle::status: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SyncRequest::GetStatus { reply: reply_tx })
            .await
            .map_err(|_| ControllerError::Closed)?;
        reply_rx.await.map_err(|_| ControllerError::Closed)
    }

    /// Stop the controller; a pending apply is dropped
    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        debug!("ControllerHandle::shutdown: called");
        self.tx
            .send(SyncRequest::Shutdown)
            .await
            .map_err(|_| ControllerError::Closed)
    }

    /// True once the controller task has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_controller() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = ControllerHandle::new(tx);

        assert!(handle.is_closed());
        assert!(matches!(handle.publish().await, Err(ControllerError::Closed)));
        assert!(matches!(handle.status().await, Err(ControllerError::Closed)));
    }

    #[tokio::test]
    async fn test_dropped_reply() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ControllerHandle::new(tx);

        tokio::spawn(async move {
            // Drop the request without replying
            let _ = rx.recv().await;
        });

        assert!(matches!(handle.publish().await, Err(ControllerError::Closed)));
    }
}
