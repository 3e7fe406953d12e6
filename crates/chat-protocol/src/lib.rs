//! Chat wire protocol: the payloads exchanged over the chat and presence
//! WebSockets.
//!
//! Chat frames are self-describing JSON text frames carrying at least a
//! `sender` and a `message` field.  The relay forwards frames verbatim, so
//! unknown fields from newer peers are tolerated and dropped.  Presence
//! frames are a bare JSON array of usernames.

use pl_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single chat message as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub sender: String,
    pub message: String,
}

impl ChatPayload {
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: message.into(),
        }
    }

    /// Serialize to the JSON text frame sent over the transport.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse an inbound text frame.
    ///
    /// Anything that is not a JSON object with string `sender` and
    /// `message` fields is an [`Error::Protocol`].
    pub fn decode(text: &str) -> Result<Self> {
        let bad = |why: String| Error::Protocol(format!("{why}: {}", preview(text)));

        // serde accepts a `[sender, message]` sequence for a struct, which
        // is not a chat frame.
        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| bad(e.to_string()))?;
        if !value.is_object() {
            return Err(bad("expected a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| bad(e.to_string()))
    }
}

/// Parse a presence frame (`["alice", "bob"]`).
pub fn decode_presence(text: &str) -> Result<Vec<String>> {
    serde_json::from_str(text).map_err(|e| Error::Protocol(format!("presence frame: {e}")))
}

/// First few characters of a frame, for error messages.
fn preview(text: &str) -> String {
    const MAX: usize = 48;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_carries_sender_and_raw_body() {
        let json = ChatPayload::new("alice", "  hello ").encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sender"], "alice");
        assert_eq!(value["message"], "  hello ");
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let p = ChatPayload::decode(r#"{"sender":"bob","message":"hi","ts":123}"#).unwrap();
        assert_eq!(p, ChatPayload::new("bob", "hi"));
    }

    #[test]
    fn plain_text_relay_notice_is_a_protocol_error() {
        let err = ChatPayload::decode("carol is not online.").unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert!(err.to_string().contains("carol is not online."));
    }

    #[test]
    fn missing_or_mistyped_fields_are_protocol_errors() {
        for bad in [
            r#"{"sender":"bob"}"#,
            r#"{"message":"hi"}"#,
            r#"{"sender":1,"message":"hi"}"#,
            r#"["bob","hi"]"#,
        ] {
            assert!(
                matches!(ChatPayload::decode(bad), Err(Error::Protocol(_))),
                "{bad} should not decode"
            );
        }
    }

    #[test]
    fn array_frames_are_not_positional_payloads() {
        let err = ChatPayload::decode(r#"["bob","hi"]"#).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"), "{err}");
        assert!(matches!(ChatPayload::decode("42"), Err(Error::Protocol(_))));
        assert!(matches!(ChatPayload::decode("null"), Err(Error::Protocol(_))));
    }

    #[test]
    fn long_frames_are_previewed_not_echoed() {
        let text = "x".repeat(500);
        let msg = ChatPayload::decode(&text).unwrap_err().to_string();
        assert!(msg.len() < 200);
        assert!(msg.ends_with('…'));
    }

    #[test]
    fn presence_frame_is_a_name_list() {
        assert_eq!(
            decode_presence(r#"["bob","carol"]"#).unwrap(),
            vec!["bob".to_string(), "carol".to_string()]
        );
        assert!(decode_presence(r#"{"online":[]}"#).is_err());
    }
}
