//! Client events and actions.

use parley_proto::{Envelope, MessageId, ReactionCode};

use crate::config::ConnectConfig;

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Executing dial/close actions and owning the socket
/// - Forwarding transport lifecycle changes and received envelopes
/// - Forwarding user intents (connect, send message, react, disconnect)
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// User wants to connect with the given settings.
    ///
    /// Validation happens here; an invalid config produces an error and no
    /// dial action.
    Connect {
        /// Settings from the connect form.
        config: ConnectConfig,
    },

    /// User wants to end the session.
    Disconnect,

    /// Transport acknowledged a connection (initial dial or an internal
    /// reconnect).
    TransportUp,

    /// Transport lost the connection for good (reconnect attempts
    /// exhausted) or was closed remotely.
    TransportDown {
        /// Close reason, when the transport reported one.
        reason: Option<String>,
    },

    /// Envelope received from the server.
    EnvelopeReceived(Envelope),

    /// User wants to send a message.
    SendMessage {
        /// Composer text (trimmed before use).
        text: String,
        /// Attached image as a base64 blob, already encoded.
        image: Option<String>,
    },

    /// User clicked a reaction on a message.
    SendReaction {
        /// Message being reacted to.
        message_id: MessageId,
        /// Which reaction.
        code: ReactionCode,
    },
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Open a socket to the given endpoint URL.
    Dial {
        /// HTTP-scheme endpoint URL; the transport maps it to a WebSocket
        /// scheme.
        url: String,
    },

    /// Send an envelope to the server.
    Send(Envelope),

    /// Close the socket and release it.
    Close,

    /// The whole log was replaced by a history replay.
    HistoryReplaced {
        /// Number of messages in the replayed history.
        count: usize,
    },

    /// One message was appended to the log.
    MessageAppended,

    /// The log entry with this id was replaced by a reaction update.
    MessageUpdated {
        /// Id of the replaced entry.
        message_id: MessageId,
    },

    /// Log message for debugging.
    Log {
        /// Log message.
        message: String,
    },
}
