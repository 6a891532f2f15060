//! Terminal collaborators for `tabsync watch`
//!
//! A watched tab has no page to render into, so the control's state changes
//! and navigations are printed instead.

use colored::Colorize;
use url::Url;

use crate::controller::{ControlState, ControlSurface, NavigationError, Navigator, Notice};

fn label_line(state: ControlState) -> String {
    match state {
        ControlState::Idle => format!("[{}]", state.label()),
        ControlState::Synced => format!("[{}]", state.label().green()),
    }
}

fn notice_line(notice: Notice, shown: bool) -> String {
    if shown {
        format!("{} {}", "+".yellow(), notice.message())
    } else {
        format!("{} {}", "-".dimmed(), notice.message().dimmed())
    }
}

fn navigate_line(location: &Url) -> String {
    format!("{} {}", "→".cyan(), location)
}

/// Prints control state changes to stdout
#[derive(Debug, Default)]
pub struct ConsoleSurface;

impl ControlSurface for ConsoleSurface {
    fn set_label(&self, state: ControlState) {
        println!("{}", label_line(state));
    }

    fn set_temporary_state(&self, notice: Notice) {
        println!("{}", notice_line(notice, true));
    }

    fn clear_temporary_state(&self, notice: Notice) {
        println!("{}", notice_line(notice, false));
    }
}

/// Prints the location a tab would load; always succeeds
#[derive(Debug, Default)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, location: &Url) -> Result<(), NavigationError> {
        println!("{}", navigate_line(location));
        Ok(())
    }
}
