//! Client state machine.
//!
//! The `Client` is the connection and message-sync controller: it owns the
//! session status, the registered profile, and the ordered message log, and
//! it mediates every UI-visible state transition. User intents become
//! outbound envelopes; inbound envelopes become log mutations.

use parley_proto::{
    ChatMessage, ClientPayload, Envelope, MessageSend, ReactionCode, ReactionSend, Registration,
    ServerPayload,
};

use crate::{
    config::ConnectConfig,
    error::ClientError,
    event::{ClientAction, ClientEvent},
    log::MessageLog,
};

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No session; the only state that accepts `Connect`.
    #[default]
    Disconnected,
    /// Dial requested, waiting for the transport acknowledgment.
    Connecting,
    /// Registered and exchanging messages.
    Connected,
}

/// Profile registered with the server for the current session.
#[derive(Debug, Clone)]
struct Profile {
    username: String,
    photo: Option<String>,
}

/// Client for a Parley chat server.
///
/// Sans-IO state machine: feed it [`ClientEvent`]s, execute the returned
/// [`ClientAction`]s. The message log is owned here and survives
/// disconnects; only a history replay replaces it.
#[derive(Debug, Default)]
pub struct Client {
    /// Connection lifecycle state.
    status: SessionStatus,

    /// Profile for the current session. `Some` from a validated connect
    /// until the session ends.
    profile: Option<Profile>,

    /// Synchronized message log.
    log: MessageLog,
}

impl Client {
    /// Create a disconnected client with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current connection lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Registered username. `None` while disconnected.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.username.as_str())
    }

    /// Messages in arrival order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        self.log.entries()
    }

    /// The owned message log.
    #[must_use]
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Process an event and return resulting actions.
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Connect { config } => self.handle_connect(&config),
            ClientEvent::Disconnect => self.handle_disconnect(),
            ClientEvent::TransportUp => self.handle_transport_up(),
            ClientEvent::TransportDown { reason } => self.handle_transport_down(reason),
            ClientEvent::EnvelopeReceived(envelope) => self.handle_envelope(&envelope),
            ClientEvent::SendMessage { text, image } => self.handle_send_message(&text, image),
            ClientEvent::SendReaction { message_id, code } => {
                self.handle_send_reaction(message_id, code)
            },
        }
    }

    fn handle_connect(&mut self, config: &ConnectConfig) -> Result<Vec<ClientAction>, ClientError> {
        if self.status != SessionStatus::Disconnected {
            return Err(ClientError::AlreadyConnected);
        }

        config.validate()?;

        self.profile = Some(Profile {
            username: config.trimmed_username().to_string(),
            photo: config.profile_photo.clone(),
        });
        self.status = SessionStatus::Connecting;

        let url = config.endpoint_url();
        Ok(vec![
            ClientAction::Log { message: format!("connecting to {url}") },
            ClientAction::Dial { url },
        ])
    }

    fn handle_disconnect(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        if self.status == SessionStatus::Disconnected {
            return Err(ClientError::NotConnected);
        }

        self.status = SessionStatus::Disconnected;
        self.profile = None;

        // Log retained across a manual disconnect; a later history replay
        // replaces it anyway.
        Ok(vec![
            ClientAction::Close,
            ClientAction::Log { message: "disconnected manually".to_string() },
        ])
    }

    /// Handle the transport's connect acknowledgment.
    ///
    /// Registration is emitted here, once per connection: on the first ack
    /// and again whenever the transport reconnects internally, since each
    /// reconnect is a fresh connection on the server side.
    fn handle_transport_up(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        let Some(profile) = self.profile.as_ref() else {
            // Ack after a manual disconnect raced the close; nothing to do.
            return Ok(vec![ClientAction::Log {
                message: "ignoring transport ack without a session".to_string(),
            }]);
        };

        let reregistering = self.status == SessionStatus::Connected;
        self.status = SessionStatus::Connected;

        let registration = ClientPayload::Register(Registration {
            username: profile.username.clone(),
            profile_photo: profile.photo.clone(),
        });
        let envelope = registration.into_envelope()?;

        let mut actions = vec![ClientAction::Send(envelope)];
        if reregistering {
            actions.push(ClientAction::Log {
                message: "transport reconnected, registering again".to_string(),
            });
        }

        Ok(actions)
    }

    fn handle_transport_down(
        &mut self,
        reason: Option<String>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.status == SessionStatus::Disconnected {
            return Ok(vec![]);
        }

        self.status = SessionStatus::Disconnected;
        self.profile = None;

        let message = match reason {
            Some(reason) => format!("connection lost: {reason}"),
            None => "connection lost".to_string(),
        };
        Ok(vec![ClientAction::Log { message }])
    }

    fn handle_send_message(
        &mut self,
        text: &str,
        image: Option<String>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.status != SessionStatus::Connected {
            return Err(ClientError::NotConnected);
        }

        let text = text.trim();
        let image = image.filter(|blob| !blob.is_empty());

        if text.is_empty() && image.is_none() {
            // Nothing to send; not an error.
            return Ok(vec![]);
        }

        let payload =
            ClientPayload::Message(MessageSend { message: text.to_string(), image });

        Ok(vec![ClientAction::Send(payload.into_envelope()?)])
    }

    /// Emit a reaction intent.
    ///
    /// No optimistic update: the log only changes when the server's
    /// reaction broadcast comes back with the full updated message.
    fn handle_send_reaction(
        &mut self,
        message_id: String,
        code: ReactionCode,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.status != SessionStatus::Connected {
            return Err(ClientError::NotConnected);
        }

        let username = self
            .profile
            .as_ref()
            .map(|p| p.username.clone())
            .ok_or(ClientError::NotConnected)?;

        let payload = ClientPayload::Reaction(ReactionSend { message_id, username, code });

        Ok(vec![ClientAction::Send(payload.into_envelope()?)])
    }

    fn handle_envelope(&mut self, envelope: &Envelope) -> Result<Vec<ClientAction>, ClientError> {
        if self.status == SessionStatus::Disconnected {
            return Ok(vec![ClientAction::Log {
                message: format!("dropping {:?} envelope without a session", envelope.event),
            }]);
        }

        match ServerPayload::from_envelope(envelope)? {
            ServerPayload::History(history) => {
                let count = history.len();
                self.log.replace_all(history);
                Ok(vec![ClientAction::HistoryReplaced { count }])
            },
            ServerPayload::Message(message) => {
                self.log.append(message);
                Ok(vec![ClientAction::MessageAppended])
            },
            ServerPayload::Reaction(update) => {
                let id = update.id.clone();
                if self.log.apply_update(update) {
                    // apply_update only succeeds when the id was present
                    let message_id = id.unwrap_or_default();
                    Ok(vec![ClientAction::MessageUpdated { message_id }])
                } else {
                    Ok(vec![ClientAction::Log {
                        message: format!(
                            "dropping reaction update for unknown message {id:?}"
                        ),
                    }])
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parley_proto::{
        ChatMessage, Envelope, ReactionCode, ReactionEntry, ServerPayload,
    };

    use super::*;
    use crate::config::ConnectMode;

    fn ngrok_config() -> ConnectConfig {
        ConnectConfig {
            mode: ConnectMode::Ngrok,
            url: "https://x.test".to_string(),
            username: "alice".to_string(),
            ..ConnectConfig::default()
        }
    }

    fn connected_client() -> Client {
        let mut client = Client::new();
        client.handle(ClientEvent::Connect { config: ngrok_config() }).unwrap();
        client.handle(ClientEvent::TransportUp).unwrap();
        client
    }

    fn server_message(id: &str, text: &str) -> ChatMessage {
        ChatMessage {
            id: Some(id.to_string()),
            username: "bob".to_string(),
            profile_photo: None,
            text: Some(text.to_string()),
            image: None,
            reactions: Vec::new(),
        }
    }

    fn inbound(payload: ServerPayload) -> ClientEvent {
        ClientEvent::EnvelopeReceived(payload.into_envelope().unwrap())
    }

    #[test]
    fn connect_with_valid_config_dials() {
        let mut client = Client::new();
        let actions = client.handle(ClientEvent::Connect { config: ngrok_config() }).unwrap();

        assert_eq!(client.status(), SessionStatus::Connecting);
        assert!(actions.iter().any(
            |a| matches!(a, ClientAction::Dial { url } if url == "https://x.test")
        ));
    }

    #[test]
    fn connect_with_empty_username_is_rejected() {
        let mut client = Client::new();
        let config = ConnectConfig { username: "  ".to_string(), ..ngrok_config() };

        let result = client.handle(ClientEvent::Connect { config });

        assert!(matches!(result, Err(ClientError::InvalidConfig { .. })));
        assert_eq!(client.status(), SessionStatus::Disconnected);
        assert!(client.username().is_none());
    }

    #[test]
    fn connect_while_connected_fails() {
        let mut client = connected_client();
        let result = client.handle(ClientEvent::Connect { config: ngrok_config() });
        assert!(matches!(result, Err(ClientError::AlreadyConnected)));
    }

    #[test]
    fn transport_ack_registers_exactly_once() {
        let mut client = Client::new();
        client.handle(ClientEvent::Connect { config: ngrok_config() }).unwrap();

        let actions = client.handle(ClientEvent::TransportUp).unwrap();

        assert_eq!(client.status(), SessionStatus::Connected);
        let registrations: Vec<_> = actions
            .iter()
            .filter(|a| {
                matches!(a, ClientAction::Send(envelope) if envelope.event == "registration")
            })
            .collect();
        assert_eq!(registrations.len(), 1);
    }

    #[test]
    fn registration_carries_profile() {
        let mut client = Client::new();
        let config = ConnectConfig {
            profile_photo: Some("cGhvdG8=".to_string()),
            ..ngrok_config()
        };
        client.handle(ClientEvent::Connect { config }).unwrap();

        let actions = client.handle(ClientEvent::TransportUp).unwrap();
        let envelope = actions
            .iter()
            .find_map(|a| match a {
                ClientAction::Send(envelope) => Some(envelope),
                _ => None,
            })
            .unwrap();

        assert_eq!(envelope.data.get("username").and_then(|v| v.as_str()), Some("alice"));
        assert_eq!(
            envelope.data.get("profilephoto").and_then(|v| v.as_str()),
            Some("cGhvdG8=")
        );
    }

    #[test]
    fn reconnect_ack_registers_again() {
        let mut client = connected_client();

        let actions = client.handle(ClientEvent::TransportUp).unwrap();

        assert!(actions.iter().any(
            |a| matches!(a, ClientAction::Send(envelope) if envelope.event == "registration")
        ));
    }

    #[test]
    fn send_message_emits_envelope_and_stays_connected() {
        let mut client = connected_client();

        let actions = client
            .handle(ClientEvent::SendMessage { text: "hello".to_string(), image: None })
            .unwrap();

        assert_eq!(actions.len(), 1);
        match &actions[0] {
            ClientAction::Send(envelope) => {
                assert_eq!(envelope.event, "message");
                assert_eq!(
                    envelope.data.get("message").and_then(|v| v.as_str()),
                    Some("hello")
                );
            },
            other => unreachable!("expected Send action, got {other:?}"),
        }
    }

    #[test]
    fn send_message_with_only_whitespace_is_a_no_op() {
        let mut client = connected_client();

        let actions = client
            .handle(ClientEvent::SendMessage { text: "   ".to_string(), image: None })
            .unwrap();
        assert!(actions.is_empty());

        let actions = client
            .handle(ClientEvent::SendMessage {
                text: String::new(),
                image: Some(String::new()),
            })
            .unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn send_message_with_image_only_is_emitted() {
        let mut client = connected_client();

        let actions = client
            .handle(ClientEvent::SendMessage {
                text: String::new(),
                image: Some("aW1hZ2U=".to_string()),
            })
            .unwrap();

        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], ClientAction::Send(_)));
    }

    #[test]
    fn send_message_while_disconnected_fails() {
        let mut client = Client::new();
        let result =
            client.handle(ClientEvent::SendMessage { text: "hi".to_string(), image: None });
        assert!(matches!(result, Err(ClientError::NotConnected)));
    }

    #[test]
    fn reaction_intent_references_message_and_sender() {
        let mut client = connected_client();

        let actions = client
            .handle(ClientEvent::SendReaction {
                message_id: "m1".to_string(),
                code: ReactionCode::Heart,
            })
            .unwrap();

        match &actions[0] {
            ClientAction::Send(envelope) => {
                assert_eq!(envelope.event, "reaction");
                assert_eq!(envelope.data.get("messageId").and_then(|v| v.as_str()), Some("m1"));
                assert_eq!(envelope.data.get("username").and_then(|v| v.as_str()), Some("alice"));
            },
            other => unreachable!("expected Send action, got {other:?}"),
        }

        // No optimistic update.
        assert!(client.messages().is_empty());
    }

    #[test]
    fn history_replay_replaces_log() {
        let mut client = connected_client();
        client.handle(inbound(ServerPayload::Message(server_message("stale", "old")))).unwrap();

        let history = vec![server_message("m1", "a"), server_message("m2", "b")];
        let actions =
            client.handle(inbound(ServerPayload::History(history.clone()))).unwrap();

        assert!(matches!(actions[0], ClientAction::HistoryReplaced { count: 2 }));
        assert_eq!(client.messages(), history.as_slice());
    }

    #[test]
    fn inbound_message_appends_in_order() {
        let mut client = connected_client();

        client.handle(inbound(ServerPayload::Message(server_message("m1", "first")))).unwrap();
        client.handle(inbound(ServerPayload::Message(server_message("m2", "second")))).unwrap();

        let texts: Vec<_> =
            client.messages().iter().filter_map(|m| m.text.as_deref()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn reaction_update_replaces_matching_entry() {
        let mut client = connected_client();
        client.handle(inbound(ServerPayload::Message(server_message("m1", "hi")))).unwrap();

        let mut update = server_message("m1", "hi");
        update.reactions.push(ReactionEntry {
            author: "bob".to_string(),
            code: ReactionCode::Heart,
        });

        let actions = client.handle(inbound(ServerPayload::Reaction(update.clone()))).unwrap();

        assert!(matches!(
            &actions[0],
            ClientAction::MessageUpdated { message_id } if message_id == "m1"
        ));
        assert_eq!(client.messages(), [update].as_slice());
    }

    #[test]
    fn reaction_update_for_unknown_id_is_dropped() {
        let mut client = connected_client();
        client.handle(inbound(ServerPayload::Message(server_message("m1", "hi")))).unwrap();
        let before = client.messages().to_vec();

        let actions = client
            .handle(inbound(ServerPayload::Reaction(server_message("missing", "x"))))
            .unwrap();

        assert!(matches!(&actions[0], ClientAction::Log { .. }));
        assert_eq!(client.messages(), before.as_slice());
    }

    #[test]
    fn malformed_envelope_is_an_error_not_a_crash() {
        let mut client = connected_client();
        let bogus = Envelope::new("typing", serde_json::Value::Null);

        let result = client.handle(ClientEvent::EnvelopeReceived(bogus));
        assert!(matches!(result, Err(ClientError::Protocol(_))));

        // Client remains usable.
        assert_eq!(client.status(), SessionStatus::Connected);
    }

    #[test]
    fn transport_loss_clears_session_but_keeps_log() {
        let mut client = connected_client();
        client.handle(inbound(ServerPayload::Message(server_message("m1", "hi")))).unwrap();

        client
            .handle(ClientEvent::TransportDown { reason: Some("io error".to_string()) })
            .unwrap();

        assert_eq!(client.status(), SessionStatus::Disconnected);
        assert!(client.username().is_none());
        assert_eq!(client.messages().len(), 1);
    }

    #[test]
    fn manual_disconnect_closes_and_keeps_log() {
        let mut client = connected_client();
        client.handle(inbound(ServerPayload::Message(server_message("m1", "hi")))).unwrap();

        let actions = client.handle(ClientEvent::Disconnect).unwrap();

        assert!(actions.contains(&ClientAction::Close));
        assert_eq!(client.status(), SessionStatus::Disconnected);
        assert_eq!(client.messages().len(), 1);
    }

    #[test]
    fn disconnect_while_disconnected_fails() {
        let mut client = Client::new();
        assert!(matches!(
            client.handle(ClientEvent::Disconnect),
            Err(ClientError::NotConnected)
        ));
    }

    #[test]
    fn envelope_while_disconnected_is_dropped() {
        let mut client = Client::new();
        let actions =
            client.handle(inbound(ServerPayload::Message(server_message("m1", "hi")))).unwrap();

        assert!(matches!(&actions[0], ClientAction::Log { .. }));
        assert!(client.messages().is_empty());
    }
}
