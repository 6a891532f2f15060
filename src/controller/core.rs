//! Main SyncController task implementation

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use super::config::ControllerConfig;
use super::handle::ControllerHandle;
use super::messages::{ControllerError, ControllerStatus, PublishOutcome, SyncRequest};
use super::surface::{ControlState, ControlSurface, Navigator, Notice};
use crate::channel::{SyncChannel, SyncEnvelope, SyncId};
use crate::window;

/// An accepted envelope waiting out the apply delay
struct PendingApply {
    deadline: Instant,
    envelope: SyncEnvelope,
}

/// Counter for transient UI states; only the newest show may revert
#[derive(Clone, Default)]
struct Generation(Arc<AtomicU64>);

impl Generation {
    fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.0.load(Ordering::SeqCst) == generation
    }
}

/// Run `f` after `delay` on its own task. Not cancellable.
fn after<F>(delay: Duration, f: F)
where
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        f();
    });
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Per-tab synchronization state machine
///
/// Publishes the tab's time window on request and applies windows published
/// by other tabs, skipping its own broadcasts and envelopes it has already
/// accepted.
pub struct SyncController {
    config: ControllerConfig,
    channel: SyncChannel,
    surface: Arc<dyn ControlSurface>,
    navigator: Arc<dyn Navigator>,
    location: Url,
    last_seen_sync_id: Option<SyncId>,
    pending: Option<PendingApply>,
    label_generation: Generation,
    nothing_to_sync_generation: Generation,
    syncing_generation: Generation,
    counters: ControllerStatus,
}

impl SyncController {
    pub fn new(
        config: ControllerConfig,
        channel: SyncChannel,
        surface: Arc<dyn ControlSurface>,
        navigator: Arc<dyn Navigator>,
        location: Url,
    ) -> Self {
        Self {
            config,
            channel,
            surface,
            navigator,
            location,
            last_seen_sync_id: None,
            pending: None,
            label_generation: Generation::default(),
            nothing_to_sync_generation: Generation::default(),
            syncing_generation: Generation::default(),
            counters: ControllerStatus::default(),
        }
    }

    /// Start listening and return a handle to the running controller
    ///
    /// The remote subscription is taken before this returns, so anything
    /// published afterwards reaches the tab.
    pub fn spawn(self) -> ControllerHandle {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer);
        let remote = self.channel.remote_envelopes();
        tokio::spawn(self.run(rx, remote));
        ControllerHandle::new(tx)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<SyncRequest>, mut remote: BoxStream<'static, SyncEnvelope>) {
        info!(
            location = %self.location,
            area_id = %self.channel.area_id(),
            key = %self.channel.key(),
            "SyncController started"
        );
        let mut remote_open = true;

        loop {
            let deadline = self.pending.as_ref().map(|p| p.deadline);

            tokio::select! {
                request = rx.recv() => match request {
                    Some(request) => {
                        if !self.handle_request(request) {
                            break;
                        }
                    }
                    None => break,
                },
                envelope = remote.next(), if remote_open => match envelope {
                    Some(envelope) => self.on_remote(envelope),
                    None => {
                        warn!("SyncController: remote stream ended, no longer receiving");
                        remote_open = false;
                    }
                },
                _ = wait_until(deadline), if deadline.is_some() => self.apply_pending(),
            }
        }

        if let Some(pending) = self.pending.take() {
            debug!(sync_id = %pending.envelope.sync_id, "SyncController: dropping pending apply on shutdown");
        }
        info!(location = %self.location, "SyncController stopped");
    }

    /// Returns false once the controller should stop
    fn handle_request(&mut self, request: SyncRequest) -> bool {
        match request {
            SyncRequest::Publish { reply } => {
                let outcome = self.publish();
                let _ = reply.send(outcome);
            }
            SyncRequest::SetLocation { location } => {
                debug!(%location, "SyncController: location changed by host");
                self.location = location;
            }
            SyncRequest::GetStatus { reply } => {
                let _ = reply.send(self.status());
            }
            SyncRequest::Shutdown => return false,
        }
        true
    }

    fn publish(&mut self) -> Result<PublishOutcome, ControllerError> {
        let window = window::extract(&self.location);
        if window.is_empty() {
            info!(location = %self.location, "SyncController::publish: nothing to sync");
            self.show_notice(Notice::NothingToSync, self.config.confirm_revert());
            return Ok(PublishOutcome::NothingToSync);
        }

        let envelope = self.channel.publish(&window, self.location.as_str())?;
        self.counters.published += 1;
        self.confirm_synced();
        Ok(PublishOutcome::Published(envelope))
    }

    fn on_remote(&mut self, envelope: SyncEnvelope) {
        self.counters.received += 1;
        let sync_id = envelope.sync_id.clone();

        if envelope.window.is_empty() {
            debug!(%sync_id, "SyncController: ignoring empty window");
            self.counters.ignored_empty += 1;
            return;
        }
        if envelope.origin_tab_key == self.location.as_str() {
            debug!(%sync_id, "SyncController: ignoring own broadcast");
            self.counters.ignored_self += 1;
            return;
        }
        if self.last_seen_sync_id.as_ref() == Some(&sync_id) {
            debug!(%sync_id, "SyncController: ignoring duplicate");
            self.counters.ignored_duplicate += 1;
            return;
        }
        self.last_seen_sync_id = Some(sync_id.clone());
        if envelope.is_legacy() {
            self.counters.accepted_legacy += 1;
        }

        let age_ms = sync_id.millis().map(|ms| chrono::Utc::now().timestamp_millis() - ms);
        info!(
            %sync_id,
            window = %envelope.window,
            origin = %envelope.origin_tab_key,
            legacy = envelope.is_legacy(),
            ?age_ms,
            "SyncController: accepted remote window"
        );
        self.show_notice(Notice::Syncing, self.config.banner());

        let deadline = Instant::now() + self.config.apply_delay();
        if let Some(superseded) = self.pending.replace(PendingApply { deadline, envelope }) {
            debug!(
                superseded = %superseded.envelope.sync_id,
                by = %sync_id,
                "SyncController: newer envelope replaces pending apply"
            );
            self.counters.superseded += 1;
        }
    }

    fn apply_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let sync_id = pending.envelope.sync_id;
        let next = window::apply(&self.location, &pending.envelope.window);

        match self.navigator.navigate(&next) {
            Ok(()) => {
                info!(%sync_id, location = %next, "SyncController: applied remote window");
                self.counters.applied += 1;
                self.location = next;
            }
            Err(e) => {
                warn!(%sync_id, error = %e, "SyncController: apply failed, staying on current location");
                self.counters.apply_failures += 1;
            }
        }
    }

    fn confirm_synced(&self) {
        self.surface.set_label(ControlState::Synced);

        let generation = self.label_generation.bump();
        let current = self.label_generation.clone();
        let surface = self.surface.clone();
        after(self.config.confirm_revert(), move || {
            if current.is_current(generation) {
                surface.set_label(ControlState::Idle);
            }
        });
    }

    fn show_notice(&self, notice: Notice, duration: Duration) {
        self.surface.set_temporary_state(notice);

        let counter = match notice {
            Notice::NothingToSync => &self.nothing_to_sync_generation,
            Notice::Syncing => &self.syncing_generation,
        };
        let generation = counter.bump();
        let current = counter.clone();
        let surface = self.surface.clone();
        after(duration, move || {
            if current.is_current(generation) {
                surface.clear_temporary_state(notice);
            }
        });
    }

    fn status(&self) -> ControllerStatus {
        ControllerStatus {
            location: self.location.to_string(),
            last_seen_sync_id: self.last_seen_sync_id.clone(),
            pending_sync_id: self.pending.as_ref().map(|p| p.envelope.sync_id.clone()),
            ..self.counters.clone()
        }
    }
}
