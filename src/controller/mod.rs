//! Per-tab sync controller
//!
//! Each tab runs one [`SyncController`] as a tokio task. The host page talks to
//! it through a [`ControllerHandle`]:
//!
//! - `publish()` broadcasts the tab's current time window to every other tab
//! - `set_location()` reports navigation the tab did on its own
//! - `status()` returns counters for observability
//!
//! Remote windows are shown with a "syncing" notice, then applied after a short
//! delay with a full navigation through the injected [`Navigator`].

mod config;
mod core;
mod handle;
mod messages;
pub mod mock;
mod surface;

pub use config::ControllerConfig;
pub use core::SyncController;
pub use handle::ControllerHandle;
pub use messages::{ControllerError, ControllerStatus, PublishOutcome, SyncRequest};
pub use mock::{RecordingNavigator, RecordingSurface, SurfaceEvent};
pub use surface::{ControlState, ControlSurface, NavigationError, Navigator, Notice};
