//! Application side-effects and intents.
//!
//! Instructions produced by the [`crate::App`] state machine for the
//! runtime to execute.

use std::path::PathBuf;

use parley_client::ConnectConfig;
use parley_proto::ReactionCode;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect with the given settings.
    ///
    /// When `photo_path` is set, the runtime reads and base64-encodes the
    /// profile photo into the config before the connect attempt; a read
    /// failure aborts the attempt.
    Connect {
        /// Settings from the connect form.
        config: ConnectConfig,
        /// Profile photo to encode before connecting.
        photo_path: Option<PathBuf>,
    },

    /// End the session.
    Disconnect,

    /// Send a message.
    ///
    /// When `image_path` is set, the runtime reads and base64-encodes the
    /// file and only then constructs the outbound event; the send waits for
    /// the encode instead of racing it.
    SendMessage {
        /// Composer text.
        text: String,
        /// Attachment to encode before sending.
        image_path: Option<PathBuf>,
    },

    /// React to a recent message.
    React {
        /// 1-based position counting back from the latest message.
        nth_latest: usize,
        /// Which reaction.
        code: ReactionCode,
    },
}
