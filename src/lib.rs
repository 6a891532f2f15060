//! TabSync - cross-tab time window synchronization
//!
//! Dashboard tabs keep their time window in the location's query component.
//! TabSync lets one tab broadcast that window and every other open tab pick it
//! up, re-navigating itself to the same range while keeping its own view.
//!
//! # Core Concepts
//!
//! - **Window in the location**: `from_ts`/`to_ts`/`live`/`refresh_mode` are read
//!   and written without touching any other parameter
//! - **One shared slot**: the latest envelope overwrites the previous one
//! - **No echo**: a tab never applies its own broadcast, nor one it already took
//!
//! # Modules
//!
//! - [`window`] - Time window extraction and application
//! - [`channel`] - Shared-slot broadcast between tabs
//! - [`controller`] - Per-tab sync state machine
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`console`] - Terminal control surface and navigator for `tabsync watch`

pub mod channel;
pub mod cli;
pub mod config;
pub mod console;
pub mod controller;
pub mod window;

// Re-export commonly used types
pub use channel::{
    ChannelError, EnvelopeError, FileStore, MemoryStore, StorageArea, StorageEvent, SyncChannel, SyncEnvelope, SyncId,
};
pub use config::{ChannelConfig, Config};
pub use controller::{
    ControlState, ControlSurface, ControllerConfig, ControllerError, ControllerHandle, ControllerStatus,
    NavigationError, Navigator, Notice, PublishOutcome, SyncController,
};
pub use window::{TimeWindow, apply, extract};
