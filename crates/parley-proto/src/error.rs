//! Protocol error types.

use thiserror::Error;

/// Errors produced while encoding or decoding wire frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame exceeds the maximum allowed size.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Observed frame size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max: usize,
    },

    /// Frame is not a valid envelope object.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Event name is not part of the protocol for this direction.
    #[error("unknown event: {0:?}")]
    UnknownEvent(String),

    /// Payload body did not match the shape the event name requires.
    #[error("failed to decode {event:?} payload: {reason}")]
    Decode {
        /// Event name the body was decoded against.
        event: String,
        /// Serde failure description.
        reason: String,
    },

    /// Payload could not be serialized.
    #[error("failed to encode payload: {0}")]
    Encode(String),
}
