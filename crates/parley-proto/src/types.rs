//! Shared chat data types.
//!
//! These types appear inside payloads in both directions: the server sends
//! them in history replays and broadcasts, the client references them when
//! reacting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned message identifier.
///
/// Opaque to the client; only used for equality when matching reaction
/// updates against log entries. Locally-sent messages have no id until the
/// server's echo arrives.
pub type MessageId = String;

/// A chat message as the server represents it.
///
/// Either `text` or `image` may be absent, but the server never broadcasts a
/// message with both missing. `reactions` is ordered by arrival at the
/// server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned id. Absent until assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,

    /// Author's display name.
    pub username: String,

    /// Author's profile photo as a base64 blob.
    #[serde(rename = "profilephoto", default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,

    /// Text body.
    #[serde(rename = "message", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Attached image as a base64 blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Reactions attached to this message, in arrival order.
    #[serde(default)]
    pub reactions: Vec<ReactionEntry>,
}

/// One reaction on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEntry {
    /// Who reacted.
    pub author: String,

    /// Which reaction.
    #[serde(rename = "reaction")]
    pub code: ReactionCode,
}

/// Fixed vocabulary of reaction codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionCode {
    /// Heart.
    Heart,
    /// Thumbs up.
    ThumbsUp,
    /// Laughing.
    Laugh,
    /// Surprised.
    Wow,
    /// Sad.
    Sad,
}

impl ReactionCode {
    /// All codes, in the order the UI offers them.
    pub const ALL: [Self; 5] = [Self::Heart, Self::ThumbsUp, Self::Laugh, Self::Wow, Self::Sad];

    /// Wire name of this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heart => "heart",
            Self::ThumbsUp => "thumbsup",
            Self::Laugh => "laugh",
            Self::Wow => "wow",
            Self::Sad => "sad",
        }
    }

    /// Parse a wire name. Returns `None` for anything outside the vocabulary.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_str() == name)
    }
}

impl fmt::Display for ReactionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reaction_code_wire_names_round_trip() {
        for code in ReactionCode::ALL {
            assert_eq!(ReactionCode::parse(code.as_str()), Some(code));

            // serde uses the same lowercase names as as_str
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{code}\""));
        }
    }

    #[test]
    fn reaction_code_rejects_unknown_name() {
        assert_eq!(ReactionCode::parse("shrug"), None);
        assert!(serde_json::from_str::<ReactionCode>("\"shrug\"").is_err());
    }

    #[test]
    fn chat_message_optional_fields_default() {
        let msg: ChatMessage = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();

        assert_eq!(msg.username, "alice");
        assert!(msg.id.is_none());
        assert!(msg.text.is_none());
        assert!(msg.image.is_none());
        assert!(msg.reactions.is_empty());
    }

    #[test]
    fn chat_message_round_trip() {
        let original = ChatMessage {
            id: Some("m1".to_string()),
            username: "bob".to_string(),
            profile_photo: Some("aGVsbG8=".to_string()),
            text: Some("hi".to_string()),
            image: None,
            reactions: vec![ReactionEntry {
                author: "alice".to_string(),
                code: ReactionCode::Heart,
            }],
        };

        let json = serde_json::to_string(&original).unwrap();
        let decoded: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn chat_message_uses_wire_field_names() {
        let msg = ChatMessage {
            id: None,
            username: "alice".to_string(),
            profile_photo: Some("cGhvdG8=".to_string()),
            text: Some("hello".to_string()),
            image: None,
            reactions: Vec::new(),
        };

        let value = serde_json::to_value(&msg).unwrap();
        assert!(value.get("profilephoto").is_some());
        assert!(value.get("message").is_some());
        assert!(value.get("profile_photo").is_none());
        assert!(value.get("text").is_none());
    }
}
