//! Client error types.

use parley_proto::ProtocolError;
use thiserror::Error;

/// Errors the client state machine can return.
///
/// None of these are fatal: the caller surfaces them as status messages and
/// the state machine remains usable.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection settings failed field-presence validation.
    ///
    /// No connection attempt is made; the reason is a user-facing message.
    #[error("{reason}")]
    InvalidConfig {
        /// User-facing description of what is missing.
        reason: String,
    },

    /// Operation requires an established connection.
    #[error("not connected")]
    NotConnected,

    /// Connect was requested while a session already exists.
    #[error("already connected")]
    AlreadyConnected,

    /// A server frame could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
