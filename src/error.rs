//! Error types for roomcast.

use thiserror::Error;

/// Common error type for roomcast.
///
/// Protocol-level failures (unknown room, taken username, ...) are not
/// represented here; they are reported back to the client as events. See
/// [`crate::chat::ChatError`].
#[derive(Error, Debug)]
pub enum RoomcastError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The relay task is no longer accepting envelopes.
    #[error("relay closed")]
    RelayClosed,
}

/// Result type alias for roomcast operations.
pub type Result<T> = std::result::Result<T, RoomcastError>;
