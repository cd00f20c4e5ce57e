//! Outbound message payloads in the LINE Messaging API wire format.

use serde::Serialize;
use serde_json::Value;

/// A single reply message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// Plain text message
    Text {
        /// Message body
        text: String,
    },
    /// Flex message (used for the command listing carousel)
    Flex {
        /// Fallback text shown in notifications
        #[serde(rename = "altText")]
        alt_text: String,
        /// Flex container (carousel of bubbles)
        contents: Value,
    },
}

impl OutboundMessage {
    /// Create a plain text message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a flex message wrapping a carousel of bubbles.
    #[must_use]
    pub fn carousel(alt_text: impl Into<String>, bubbles: Vec<Value>) -> Self {
        Self::Flex {
            alt_text: alt_text.into(),
            contents: serde_json::json!({
                "type": "carousel",
                "contents": bubbles,
            }),
        }
    }

    /// Text body, if this is a text message.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Flex { .. } => None,
        }
    }
}

/// Body of a reply request.
#[derive(Debug, Serialize)]
pub struct ReplyPayload<'a> {
    /// One-time reply token of the triggering event
    #[serde(rename = "replyToken")]
    pub reply_token: &'a str,
    /// Messages to send (exactly one per inbound event here)
    pub messages: Vec<&'a OutboundMessage>,
}

impl<'a> ReplyPayload<'a> {
    /// Build a payload carrying one message.
    #[must_use]
    pub fn single(reply_token: &'a str, message: &'a OutboundMessage) -> Self {
        Self {
            reply_token,
            messages: vec![message],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_message_wire_format() {
        let msg = OutboundMessage::text("hello");
        assert_eq!(
            serde_json::to_value(&msg).expect("serializable"),
            json!({"type": "text", "text": "hello"})
        );
    }

    #[test]
    fn test_flex_message_wire_format() {
        let msg = OutboundMessage::carousel("コマンド一覧", vec![json!({"type": "bubble"})]);
        assert_eq!(
            serde_json::to_value(&msg).expect("serializable"),
            json!({
                "type": "flex",
                "altText": "コマンド一覧",
                "contents": {"type": "carousel", "contents": [{"type": "bubble"}]}
            })
        );
        assert!(msg.as_text().is_none());
    }

    #[test]
    fn test_reply_payload() {
        let msg = OutboundMessage::text("x");
        let payload = ReplyPayload::single("tok", &msg);
        assert_eq!(
            serde_json::to_value(&payload).expect("serializable"),
            json!({"replyToken": "tok", "messages": [{"type": "text", "text": "x"}]})
        );
    }
}
