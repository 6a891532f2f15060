//! Broadcast channel between tabs
//!
//! Tabs share nothing but a key-value store. One key (the slot) holds the most
//! recent [`SyncEnvelope`]; writing it notifies every other listening tab.
//!
//! ```text
//!   tab A                      shared store                     tab B
//! ┌──────────────┐  set_item  ┌──────────────────┐  changes  ┌──────────────┐
//! │ SyncChannel  │ ─────────► │ "dd-timestamp-   │ ────────► │ SyncChannel  │
//! │   publish    │            │  sync" = envelope│           │ remote stream│
//! └──────────────┘            └──────────────────┘           └──────────────┘
//!        ✗ no notification back to the writer
//! ```
//!
//! The store is abstracted as [`StorageArea`]. [`MemoryStore`] shares a slot
//! between tabs in one process; [`FileStore`] shares it between processes.

mod adapter;
mod envelope;
mod error;
mod file;
mod memory;
mod store;

pub use adapter::{DEFAULT_CHANNEL_KEY, SyncChannel};
pub use envelope::{ENVELOPE_VERSION, SyncEnvelope, SyncId};
pub use error::{ChannelError, EnvelopeError};
pub use file::{FileArea, FileStore};
pub use memory::{DEFAULT_EVENT_CAPACITY, MemoryArea, MemoryStore};
pub use store::{AreaId, StorageArea, StorageEvent};
