//! Inbound webhook payload parsing.
//!
//! Extracts the reply token and command line from a LINE webhook body.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while reading a webhook body
#[derive(Debug, Error)]
pub enum EventError {
    /// Body is not valid JSON for the webhook shape
    #[error("invalid webhook JSON: {0}")]
    Json(String),
    /// Body contains no events
    #[error("webhook body contains no events")]
    NoEvents,
    /// Event has no reply token
    #[error("event has no reply token")]
    MissingReplyToken,
    /// Event has neither message text nor postback data
    #[error("event has no message text or postback data")]
    MissingText {
        /// Token of the event, already read
        reply_token: String,
    },
}

impl EventError {
    /// Reply token read before the failure, if any.
    #[must_use]
    pub fn reply_token(&self) -> Option<&str> {
        match self {
            Self::MissingText { reply_token } => Some(reply_token.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "replyToken", default)]
    reply_token: Option<String>,
    #[serde(default)]
    message: Option<RawMessage>,
    #[serde(default)]
    postback: Option<RawPostback>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPostback {
    #[serde(default)]
    data: Option<String>,
}

/// One-time reply token issued by the platform.
#[derive(Clone, PartialEq, Eq)]
pub struct ReplyToken(String);

impl ReplyToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials for one reply; keep them out of logs.
impl fmt::Debug for ReplyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReplyToken({}…)", crate::utils::truncate_str(&self.0, 4))
    }
}

/// The event that triggered this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Reply token of the event
    pub reply_token: ReplyToken,
    /// Command line (postback data or message text)
    pub text: String,
}

impl InboundEvent {
    /// Parse a webhook body.
    ///
    /// Events are read in order and each one replaces the previous, so
    /// the last event of a batch is the one answered. Postback data takes
    /// precedence over message text within an event.
    ///
    /// # Errors
    ///
    /// Returns an `EventError` if the body is malformed or the selected
    /// event lacks a token or text.
    pub fn from_webhook(body: &[u8]) -> Result<Self, EventError> {
        let body: WebhookBody =
            serde_json::from_slice(body).map_err(|e| EventError::Json(e.to_string()))?;

        let mut selected = None;
        for event in body.events {
            let text = event
                .postback
                .and_then(|p| p.data)
                .filter(|data| !data.is_empty())
                .or_else(|| event.message.and_then(|m| m.text));
            selected = Some((event.reply_token, text));
        }

        let (token, text) = selected.ok_or(EventError::NoEvents)?;
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(EventError::MissingReplyToken)?;
        let Some(text) = text else {
            return Err(EventError::MissingText { reply_token: token });
        };

        Ok(Self {
            reply_token: ReplyToken::new(token),
            text,
        })
    }
}

/// Per-request context threaded through dispatch and reply.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation id for log lines of this request
    pub request_id: Uuid,
    /// Token the reply must be sent with
    pub reply_token: ReplyToken,
}

impl RequestContext {
    /// Create a context for the given event.
    #[must_use]
    pub fn new(event: &InboundEvent) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            reply_token: event.reply_token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_event() {
        let body = r#"{"events":[{"replyToken":"abc","message":{"text":"lunch 渋谷"}}]}"#;
        let event = InboundEvent::from_webhook(body.as_bytes()).expect("valid event");
        assert_eq!(event.reply_token.as_str(), "abc");
        assert_eq!(event.text, "lunch 渋谷");
    }

    #[test]
    fn test_postback_overrides_text() {
        let body = br#"{"events":[{"replyToken":"abc","message":{"text":"hello"},"postback":{"data":"qiita"}}]}"#;
        let event = InboundEvent::from_webhook(body).expect("valid event");
        assert_eq!(event.text, "qiita");
    }

    #[test]
    fn test_empty_postback_falls_back_to_text() {
        let body = br#"{"events":[{"replyToken":"abc","message":{"text":"hello"},"postback":{"data":""}}]}"#;
        let event = InboundEvent::from_webhook(body).expect("valid event");
        assert_eq!(event.text, "hello");
    }

    #[test]
    fn test_last_event_wins() {
        let body = br#"{"events":[
            {"replyToken":"first","message":{"text":"lunch"}},
            {"replyToken":"second","postback":{"data":"nomitai"}}
        ]}"#;
        let event = InboundEvent::from_webhook(body).expect("valid event");
        assert_eq!(event.reply_token.as_str(), "second");
        assert_eq!(event.text, "nomitai");
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(
            InboundEvent::from_webhook(b"not json"),
            Err(EventError::Json(_))
        ));
        assert!(matches!(
            InboundEvent::from_webhook(b"{}"),
            Err(EventError::NoEvents)
        ));
        assert!(matches!(
            InboundEvent::from_webhook(br#"{"events":[{"message":{"text":"x"}}]}"#),
            Err(EventError::MissingReplyToken)
        ));
        assert!(matches!(
            InboundEvent::from_webhook(br#"{"events":[{"replyToken":"t"}]}"#),
            Err(EventError::MissingText { .. })
        ));
    }

    #[test]
    fn test_missing_text_keeps_token() {
        let err = InboundEvent::from_webhook(br#"{"events":[{"replyToken":"t","message":{}}]}"#)
            .expect_err("no text");
        assert_eq!(err.reply_token(), Some("t"));
        assert_eq!(EventError::NoEvents.reply_token(), None);
    }

    #[test]
    fn test_reply_token_debug_is_masked() {
        let token = ReplyToken::new("0123456789abcdef");
        assert_eq!(format!("{token:?}"), "ReplyToken(0123…)");
    }

    #[test]
    fn test_request_context_carries_event_token() {
        let event = InboundEvent {
            reply_token: ReplyToken::new("tok"),
            text: "qiita".to_string(),
        };
        let a = RequestContext::new(&event);
        let b = RequestContext::new(&event);
        assert_eq!(a.reply_token, event.reply_token);
        assert_ne!(a.request_id, b.request_id);
    }
}
