//! Envelope type combining event name and body.
//!
//! An `Envelope` is the transport-layer frame: a JSON object with exactly
//! two fields, the event name and an untyped body. This is a pure data
//! holder (name + raw JSON). For high-level logic, see
//! `ClientPayload::into_envelope()` / `ServerPayload::from_envelope()` and
//! their mirrors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// Complete protocol frame (transport layer).
///
/// Layout on the wire: `{"event": <name>, "data": <body>}` as a single JSON
/// text message.
///
/// Holds the body as raw [`Value`], NOT a typed payload enum. A relay can
/// route frames on the event name without understanding the body.
///
/// # Invariants
///
/// - Size Limit: the encoded text MUST NOT exceed [`Envelope::MAX_FRAME_SIZE`].
///   Violations are rejected during decoding and encoding, before any body
///   parsing happens.
///
/// # Security
///
/// Provides structural validity only: the frame is a JSON object with a
/// string event name. It does NOT guarantee the body matches the shape the
/// event name implies; that validation happens in the typed payload
/// decoders with explicit error handling.
// No Eq: the raw body is a serde_json::Value, which is PartialEq only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name (e.g. `"message"`).
    pub event: String,

    /// Raw JSON body (not yet interpreted).
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Maximum encoded frame size (16 MB).
    ///
    /// Base64 image blobs dominate frame size; anything beyond this is
    /// rejected before the JSON parser sees it, bounding parser work on
    /// hostile input.
    pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

    /// Create an envelope from an event name and body.
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self { event: event.into(), data }
    }

    /// Encode the envelope as a JSON text frame.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Encode`] if serialization fails
    /// - [`ProtocolError::FrameTooLarge`] if the encoded text exceeds
    ///   [`Self::MAX_FRAME_SIZE`]
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let text =
            serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))?;

        if text.len() > Self::MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size: text.len(),
                max: Self::MAX_FRAME_SIZE,
            });
        }

        Ok(text)
    }

    /// Decode an envelope from a JSON text frame.
    ///
    /// Returns an `Envelope` with a raw body (does NOT interpret the body).
    /// Use the typed payload decoders if you need the high-level enums.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::FrameTooLarge`] if the text exceeds
    ///   [`Self::MAX_FRAME_SIZE`]; this check happens BEFORE parsing begins
    /// - [`ProtocolError::MalformedEnvelope`] if the text is not a JSON
    ///   object with a string `event` field
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        if text.len() > Self::MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size: text.len(),
                max: Self::MAX_FRAME_SIZE,
            });
        }

        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_round_trip() {
        let envelope = Envelope::new("message", json!({"message": "hi", "image": null}));

        let wire = envelope.encode().unwrap();
        let parsed = Envelope::decode(&wire).unwrap();
        assert_eq!(envelope, parsed);
    }

    #[test]
    fn missing_data_defaults_to_null() {
        let parsed = Envelope::decode(r#"{"event":"registration"}"#).unwrap();
        assert_eq!(parsed.event, "registration");
        assert_eq!(parsed.data, Value::Null);
    }

    #[test]
    fn reject_non_object_frame() {
        assert!(matches!(
            Envelope::decode("[1,2,3]"),
            Err(ProtocolError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            Envelope::decode("not json"),
            Err(ProtocolError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn reject_oversized_frame() {
        let text = "x".repeat(Envelope::MAX_FRAME_SIZE + 1);
        assert!(matches!(Envelope::decode(&text), Err(ProtocolError::FrameTooLarge { .. })));
    }

    proptest! {
        #[test]
        fn envelope_text_round_trip(
            event in "[a-zA-Z]{1,16}",
            body in "[ -~]{0,64}",
        ) {
            let envelope = Envelope::new(event, json!({ "body": body }));

            let wire = envelope.encode().unwrap();
            let parsed = Envelope::decode(&wire).unwrap();
            prop_assert_eq!(envelope, parsed);
        }

        #[test]
        fn decode_never_panics(text in "\\PC{0,256}") {
            let _ = Envelope::decode(&text);
        }
    }
}
