//! Channel error types

use thiserror::Error;

/// Errors decoding or encoding a sync envelope
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Malformed envelope: {0}")]
    Malformed(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the shared store or the adapter on top of it
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("Refusing to broadcast an empty time window")]
    EmptyWindow,
}

impl ChannelError {
    /// Check if this error came from a bad payload rather than the store itself
    pub fn is_malformed(&self) -> bool {
        matches!(self, ChannelError::Envelope(_))
    }
}
