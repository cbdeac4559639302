//! Observable application state types.
//!
//! The "View Model" for the UI: the subset of protocol state necessary for
//! rendering, without exposing the client's internals.

/// Connection state as the UI sees it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected; the connect form is shown.
    #[default]
    Disconnected,
    /// Dial in progress.
    Connecting,
    /// Registered and chatting.
    Connected {
        /// Name the session registered with.
        username: String,
    },
}

impl ConnectionState {
    /// Whether messaging is unlocked.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}
