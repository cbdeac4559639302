//! Typed payloads and event-name mapping.
//!
//! Envelope bodies are untyped JSON; the enums here give them shape. The
//! event name in the envelope determines the payload type, so bodies carry
//! no variant tag of their own. Because the `message` and `reaction` event
//! names carry different shapes per direction, the mapping is split into
//! [`ClientPayload`] (client→server) and [`ServerPayload`] (server→client).
//!
//! # Invariants
//!
//! - Each payload variant maps to exactly one event name in its direction.
//!   Adding a variant causes compile errors in `event()`, `into_envelope()`,
//!   and `from_envelope()`, so no variant is accidentally left unhandled.
//! - Encoding a payload and decoding the resulting envelope in the same
//!   direction MUST produce an equivalent value (verified by round-trip
//!   tests).

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    envelope::Envelope,
    error::ProtocolError,
    types::{ChatMessage, MessageId, ReactionCode},
};

/// Event name for profile registration.
pub const EVENT_REGISTRATION: &str = "registration";
/// Event name for the history replay.
pub const EVENT_MESSAGE_HISTORY: &str = "messageHistory";
/// Event name for messages, both directions.
pub const EVENT_MESSAGE: &str = "message";
/// Event name for reactions, both directions.
pub const EVENT_REACTION: &str = "reaction";

/// Profile registration, sent once per connection after the connect
/// acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Display name to register.
    pub username: String,

    /// Profile photo as a base64 blob.
    #[serde(rename = "profilephoto", default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

/// Outbound chat message.
///
/// The server assigns the id, stamps the sender's profile, and echoes the
/// result back as a [`ChatMessage`] broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSend {
    /// Text body. May be empty when an image is attached.
    pub message: String,

    /// Attached image as a base64 blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Outbound reaction intent.
///
/// The server owns toggle semantics: it adds or removes the entry and
/// broadcasts the full updated message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSend {
    /// Message being reacted to.
    #[serde(rename = "messageId")]
    pub message_id: MessageId,

    /// Who is reacting.
    pub username: String,

    /// Which reaction.
    #[serde(rename = "reaction")]
    pub code: ReactionCode,
}

/// Payloads the client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPayload {
    /// Profile registration.
    Register(Registration),
    /// Chat message.
    Message(MessageSend),
    /// Reaction intent.
    Reaction(ReactionSend),
}

impl ClientPayload {
    /// Event name corresponding to this payload.
    #[must_use]
    pub const fn event(&self) -> &'static str {
        match self {
            Self::Register(_) => EVENT_REGISTRATION,
            Self::Message(_) => EVENT_MESSAGE,
            Self::Reaction(_) => EVENT_REACTION,
        }
    }

    /// Convert the payload into a transport envelope.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Encode`] if serialization fails
    pub fn into_envelope(self) -> Result<Envelope, ProtocolError> {
        let event = self.event();
        let data = match self {
            Self::Register(inner) => serde_json::to_value(inner),
            Self::Message(inner) => serde_json::to_value(inner),
            Self::Reaction(inner) => serde_json::to_value(inner),
        }
        .map_err(|e| ProtocolError::Encode(e.to_string()))?;

        Ok(Envelope::new(event, data))
    }

    /// Parse a payload from an envelope received from a client.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::UnknownEvent`] if the event name is not one a
    ///   client sends
    /// - [`ProtocolError::Decode`] if the body does not match the event's
    ///   shape
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        match envelope.event.as_str() {
            EVENT_REGISTRATION => decode_body(envelope).map(Self::Register),
            EVENT_MESSAGE => decode_body(envelope).map(Self::Message),
            EVENT_REACTION => decode_body(envelope).map(Self::Reaction),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

/// Payloads the server sends to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPayload {
    /// Bulk history replay, delivered once after registration. Ordered by
    /// arrival at the server.
    History(Vec<ChatMessage>),
    /// One broadcast message.
    Message(ChatMessage),
    /// Full updated message after a reaction toggle.
    Reaction(ChatMessage),
}

impl ServerPayload {
    /// Event name corresponding to this payload.
    #[must_use]
    pub const fn event(&self) -> &'static str {
        match self {
            Self::History(_) => EVENT_MESSAGE_HISTORY,
            Self::Message(_) => EVENT_MESSAGE,
            Self::Reaction(_) => EVENT_REACTION,
        }
    }

    /// Convert the payload into a transport envelope.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Encode`] if serialization fails
    pub fn into_envelope(self) -> Result<Envelope, ProtocolError> {
        let event = self.event();
        let data = match self {
            Self::History(inner) => serde_json::to_value(inner),
            Self::Message(inner) => serde_json::to_value(inner),
            Self::Reaction(inner) => serde_json::to_value(inner),
        }
        .map_err(|e| ProtocolError::Encode(e.to_string()))?;

        Ok(Envelope::new(event, data))
    }

    /// Parse a payload from an envelope received from the server.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::UnknownEvent`] if the event name is not one the
    ///   server sends
    /// - [`ProtocolError::Decode`] if the body does not match the event's
    ///   shape
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        match envelope.event.as_str() {
            EVENT_MESSAGE_HISTORY => decode_body(envelope).map(Self::History),
            EVENT_MESSAGE => decode_body(envelope).map(Self::Message),
            EVENT_REACTION => decode_body(envelope).map(Self::Reaction),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

fn decode_body<T: DeserializeOwned>(envelope: &Envelope) -> Result<T, ProtocolError> {
    serde_json::from_value(envelope.data.clone()).map_err(|e| ProtocolError::Decode {
        event: envelope.event.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ReactionEntry;

    fn sample_message(id: &str) -> ChatMessage {
        ChatMessage {
            id: Some(id.to_string()),
            username: "alice".to_string(),
            profile_photo: None,
            text: Some("hello".to_string()),
            image: None,
            reactions: Vec::new(),
        }
    }

    #[test]
    fn registration_round_trip() {
        let payload = ClientPayload::Register(Registration {
            username: "alice".to_string(),
            profile_photo: Some("cGhvdG8=".to_string()),
        });

        let envelope = payload.clone().into_envelope().unwrap();
        assert_eq!(envelope.event, EVENT_REGISTRATION);

        let decoded = ClientPayload::from_envelope(&envelope).unwrap();
        assert_eq!(payload, decoded);
    }

    #[test]
    fn message_event_name_is_direction_dependent() {
        let outbound = ClientPayload::Message(MessageSend {
            message: "hi".to_string(),
            image: None,
        });
        let inbound = ServerPayload::Message(sample_message("m1"));

        // Same event name, different shapes per direction.
        assert_eq!(outbound.event(), inbound.event());

        let envelope = inbound.into_envelope().unwrap();
        let decoded = ServerPayload::from_envelope(&envelope).unwrap();
        assert!(matches!(decoded, ServerPayload::Message(m) if m.id.as_deref() == Some("m1")));
    }

    #[test]
    fn history_round_trip_preserves_order() {
        let history = vec![sample_message("m1"), sample_message("m2"), sample_message("m3")];
        let envelope = ServerPayload::History(history.clone()).into_envelope().unwrap();

        let decoded = ServerPayload::from_envelope(&envelope).unwrap();
        match decoded {
            ServerPayload::History(msgs) => assert_eq!(msgs, history),
            other => unreachable!("expected History, got {other:?}"),
        }
    }

    #[test]
    fn reaction_intent_uses_wire_field_names() {
        let payload = ClientPayload::Reaction(ReactionSend {
            message_id: "m7".to_string(),
            username: "bob".to_string(),
            code: ReactionCode::Heart,
        });

        let envelope = payload.into_envelope().unwrap();
        assert_eq!(envelope.data.get("messageId").and_then(|v| v.as_str()), Some("m7"));
        assert_eq!(envelope.data.get("reaction").and_then(|v| v.as_str()), Some("heart"));
    }

    #[test]
    fn reaction_broadcast_carries_full_message() {
        let mut msg = sample_message("m1");
        msg.reactions.push(ReactionEntry {
            author: "bob".to_string(),
            code: ReactionCode::Laugh,
        });

        let envelope = ServerPayload::Reaction(msg.clone()).into_envelope().unwrap();
        let decoded = ServerPayload::from_envelope(&envelope).unwrap();
        assert_eq!(decoded, ServerPayload::Reaction(msg));
    }

    #[test]
    fn unknown_event_is_rejected_per_direction() {
        let envelope = Envelope::new("messageHistory", serde_json::json!([]));

        // History is a server→client event only.
        assert!(matches!(
            ClientPayload::from_envelope(&envelope),
            Err(ProtocolError::UnknownEvent(_))
        ));
        assert!(ServerPayload::from_envelope(&envelope).is_ok());

        let envelope = Envelope::new("typing", serde_json::Value::Null);
        assert!(matches!(
            ServerPayload::from_envelope(&envelope),
            Err(ProtocolError::UnknownEvent(_))
        ));
    }

    #[test]
    fn mismatched_body_is_a_decode_error() {
        let envelope = Envelope::new(EVENT_MESSAGE, serde_json::json!("just a string"));
        assert!(matches!(
            ServerPayload::from_envelope(&envelope),
            Err(ProtocolError::Decode { .. })
        ));
    }
}
