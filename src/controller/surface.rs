//! Collaborators injected into a controller: the sync control and navigation

use thiserror::Error;
use url::Url;

/// Persistent label state of the sync control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    /// Confirmation after a publish; reverts to `Idle` on its own
    Synced,
}

impl ControlState {
    pub fn label(&self) -> &'static str {
        match self {
            ControlState::Idle => "Sync",
            ControlState::Synced => "✅ Synced!",
        }
    }
}

/// Transient notices shown next to the control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Publish was requested but the location carries no time window
    NothingToSync,
    /// A remote window was accepted and is about to be applied
    Syncing,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NothingToSync => "No timestamp found in current URL to sync",
            Notice::Syncing => "🕐 Syncing timestamp...",
        }
    }
}

/// Handle to the control the host page mounted for this tab
///
/// The controller pushes state changes through it and never touches
/// presentation itself.
pub trait ControlSurface: Send + Sync {
    fn set_label(&self, state: ControlState);

    fn set_temporary_state(&self, notice: Notice);

    fn clear_temporary_state(&self, notice: Notice);
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Navigation rejected: {0}")]
    Rejected(String),
}

/// Performs a full load of a new location in the tab
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &Url) -> Result<(), NavigationError>;
}
