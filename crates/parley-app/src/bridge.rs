//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the low-level [`parley_client::Client`] and adapts
//! it to the high-level application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level intents (connect, send, react) into client events.
//! - Accumulates outgoing [`Envelope`]s and the pending dial/close requests
//!   for the runtime to execute in the next I/O cycle.
//! - Interprets client actions and converts them back into
//!   [`crate::AppEvent`]s to update the UI.
//! - Exposes the client's message log and status to the rendering layer,
//!   which never holds its own copy.

use parley_client::{Client, ClientAction, ClientError, ClientEvent, ConnectConfig, SessionStatus};
use parley_proto::{ChatMessage, Envelope, ReactionCode};

use crate::AppEvent;

/// Bridge between App and Client protocol logic.
#[derive(Debug, Default)]
pub struct Bridge {
    client: Client,
    outgoing: Vec<Envelope>,
    pending_dial: Option<String>,
    pending_close: bool,
}

impl Bridge {
    /// Create a new Bridge around a fresh client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect with the given settings.
    ///
    /// Emits [`AppEvent::Connecting`] when validation passes (and queues the
    /// dial), or [`AppEvent::Error`] when it fails.
    pub fn connect(&mut self, config: ConnectConfig) -> Vec<AppEvent> {
        match self.client.handle(ClientEvent::Connect { config }) {
            Ok(actions) => {
                self.execute(actions);
                vec![AppEvent::Connecting]
            },
            Err(e) => vec![error_event(&e)],
        }
    }

    /// End the session. Queues the close for the runtime.
    pub fn disconnect(&mut self) -> Vec<AppEvent> {
        match self.client.handle(ClientEvent::Disconnect) {
            Ok(actions) => {
                self.execute(actions);
                vec![AppEvent::Disconnected { reason: None }]
            },
            Err(e) => vec![error_event(&e)],
        }
    }

    /// Send a message. `image` is the already-encoded attachment blob.
    ///
    /// An empty send (both parts blank after trimming) produces no events
    /// and nothing outgoing.
    pub fn send_message(&mut self, text: String, image: Option<String>) -> Vec<AppEvent> {
        match self.client.handle(ClientEvent::SendMessage { text, image }) {
            Ok(actions) => {
                self.execute(actions);
                vec![]
            },
            Err(e) => vec![error_event(&e)],
        }
    }

    /// React to the n-th latest message (1 = latest).
    ///
    /// Resolution happens against the client's log: positions without a
    /// server-assigned id yet cannot be reacted to.
    pub fn react_to_nth_latest(&mut self, nth_latest: usize, code: ReactionCode) -> Vec<AppEvent> {
        let messages = self.client.messages();

        let Some(index) = nth_latest
            .checked_sub(1)
            .and_then(|back| messages.len().checked_sub(back + 1))
        else {
            return vec![AppEvent::Error { message: format!("no message #{nth_latest}") }];
        };

        let Some(message_id) = messages[index].id.clone() else {
            return vec![AppEvent::Error {
                message: format!("message #{nth_latest} has no id yet"),
            }];
        };

        match self.client.handle(ClientEvent::SendReaction { message_id, code }) {
            Ok(actions) => {
                self.execute(actions);
                vec![]
            },
            Err(e) => vec![error_event(&e)],
        }
    }

    /// Transport acknowledged a connection.
    ///
    /// An ack that raced a manual disconnect finds no session and reports
    /// nothing.
    pub fn transport_up(&mut self) -> Vec<AppEvent> {
        match self.client.handle(ClientEvent::TransportUp) {
            Ok(actions) => {
                self.execute(actions);
                match self.client.username() {
                    Some(username) => {
                        vec![AppEvent::Connected { username: username.to_string() }]
                    },
                    None => vec![],
                }
            },
            Err(e) => vec![error_event(&e)],
        }
    }

    /// Transport lost the connection for good.
    pub fn transport_down(&mut self, reason: Option<String>) -> Vec<AppEvent> {
        match self.client.handle(ClientEvent::TransportDown { reason: reason.clone() }) {
            Ok(actions) => {
                self.execute(actions);
                vec![AppEvent::Disconnected { reason }]
            },
            Err(e) => vec![error_event(&e)],
        }
    }

    /// Handle an envelope from the server.
    pub fn handle_envelope(&mut self, envelope: Envelope) -> Vec<AppEvent> {
        match self.client.handle(ClientEvent::EnvelopeReceived(envelope)) {
            Ok(actions) => {
                let changed = actions.iter().any(|action| {
                    matches!(
                        action,
                        ClientAction::HistoryReplaced { .. }
                            | ClientAction::MessageAppended
                            | ClientAction::MessageUpdated { .. }
                    )
                });
                self.execute(actions);
                if changed { vec![AppEvent::LogChanged] } else { vec![] }
            },
            Err(e) => vec![error_event(&e)],
        }
    }

    /// Take pending outgoing envelopes.
    pub fn take_outgoing(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.outgoing)
    }

    /// Take the pending dial request, if any.
    pub fn take_dial(&mut self) -> Option<String> {
        self.pending_dial.take()
    }

    /// Take the pending close request.
    pub fn take_close(&mut self) -> bool {
        std::mem::take(&mut self.pending_close)
    }

    /// Messages in arrival order, straight from the client's log.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        self.client.messages()
    }

    /// The client's session status.
    #[must_use]
    pub fn session_status(&self) -> SessionStatus {
        self.client.status()
    }

    fn execute(&mut self, actions: Vec<ClientAction>) {
        for action in actions {
            match action {
                ClientAction::Send(envelope) => self.outgoing.push(envelope),
                ClientAction::Dial { url } => self.pending_dial = Some(url),
                ClientAction::Close => self.pending_close = true,
                ClientAction::HistoryReplaced { count } => {
                    tracing::info!("history replay replaced the log with {count} messages");
                },
                ClientAction::MessageAppended | ClientAction::MessageUpdated { .. } => {},
                ClientAction::Log { message } => tracing::debug!("{message}"),
            }
        }
    }
}

fn error_event(error: &ClientError) -> AppEvent {
    AppEvent::Error { message: error.to_string() }
}
