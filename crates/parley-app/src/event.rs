//! Application input events.
//!
//! Events originate from two distinct sources:
//! - User interactions (resize) and system ticks.
//! - Protocol notifications translated from the underlying client by the
//!   [`crate::Bridge`].

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Dial in progress (config passed validation).
    Connecting,

    /// Connected and registered.
    Connected {
        /// Name the session registered with.
        username: String,
    },

    /// Session ended, by the user or by transport loss.
    Disconnected {
        /// Loss reason; `None` for a manual disconnect.
        reason: Option<String>,
    },

    /// The message log changed (history replay, broadcast, or reaction
    /// update).
    LogChanged,

    /// Error to surface in the status line.
    Error {
        /// User-facing description.
        message: String,
    },
}
