//! Recording collaborators for tests and headless hosts
//!
//! Both record every call so a test can assert on what the controller asked
//! the tab to do.

use std::sync::{Mutex, MutexGuard};

use url::Url;

use super::surface::{ControlState, ControlSurface, NavigationError, Navigator, Notice};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// A recorded call to a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Label(ControlState),
    Show(Notice),
    Clear(Notice),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        lock(&self.events).clone()
    }

    /// Most recent label pushed, `Idle` if none
    pub fn label(&self) -> ControlState {
        lock(&self.events)
            .iter()
            .rev()
            .find_map(|e| match e {
                SurfaceEvent::Label(state) => Some(*state),
                _ => None,
            })
            .unwrap_or(ControlState::Idle)
    }

    /// Notices currently shown (shown and not yet cleared)
    pub fn visible_notices(&self) -> Vec<Notice> {
        let mut visible = Vec::new();
        for event in lock(&self.events).iter() {
            match event {
                SurfaceEvent::Show(notice) => visible.push(*notice),
                SurfaceEvent::Clear(notice) => visible.retain(|n| n != notice),
                SurfaceEvent::Label(_) => {}
            }
        }
        visible
    }

    pub fn count(&self, event: &SurfaceEvent) -> usize {
        lock(&self.events).iter().filter(|e| *e == event).count()
    }
}

impl ControlSurface for RecordingSurface {
    fn set_label(&self, state: ControlState) {
        lock(&self.events).push(SurfaceEvent::Label(state));
    }

    fn set_temporary_state(&self, notice: Notice) {
        lock(&self.events).push(SurfaceEvent::Show(notice));
    }

    fn clear_temporary_state(&self, notice: Notice) {
        lock(&self.events).push(SurfaceEvent::Clear(notice));
    }
}

/// Navigator that records locations instead of loading them
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Url>>,
    failure: Mutex<Option<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A navigator whose every navigation is rejected with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            visited: Mutex::new(Vec::new()),
            failure: Mutex::new(Some(reason.into())),
        }
    }

    pub fn visited(&self) -> Vec<Url> {
        lock(&self.visited).clone()
    }

    pub fn last(&self) -> Option<Url> {
        lock(&self.visited).last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: &Url) -> Result<(), NavigationError> {
        if let Some(reason) = lock(&self.failure).clone() {
            return Err(NavigationError::Rejected(reason));
        }
        lock(&self.visited).push(location.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_surface() {
        let surface = RecordingSurface::new();
        assert_eq!(surface.label(), ControlState::Idle);

        surface.set_label(ControlState::Synced);
        surface.set_temporary_state(Notice::Syncing);
        surface.set_temporary_state(Notice::NothingToSync);
        surface.clear_temporary_state(Notice::Syncing);

        assert_eq!(surface.label(), ControlState::Synced);
        assert_eq!(surface.visible_notices(), vec![Notice::NothingToSync]);
        assert_eq!(surface.count(&SurfaceEvent::Show(Notice::Syncing)), 1);
    }

    #[test]
    fn test_recording_navigator() {
        let navigator = RecordingNavigator::new();
        let url = Url::parse("https://a/?from_ts=1").unwrap();
        navigator.navigate(&url).unwrap();
        assert_eq!(navigator.last(), Some(url));

        let failing = RecordingNavigator::failing("blocked");
        let err = failing.navigate(&Url::parse("https://a/").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "Navigation rejected: blocked");
        assert!(failing.visited().is_empty());
    }
}
