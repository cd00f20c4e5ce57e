//! Reply delivery to the chat platform.
//!
//! One authenticated POST per inbound event, no retry. Failures are
//! returned to the caller, which logs and swallows them.

use crate::bot::event::ReplyToken;
use crate::bot::message::{OutboundMessage, ReplyPayload};
use crate::http::clean_error_body;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

/// Errors raised while sending a reply
#[derive(Debug, Error)]
pub enum ReplyError {
    /// Request could not be delivered
    #[error("reply request failed: {0}")]
    Network(String),
    /// Platform rejected the reply
    #[error("reply rejected with status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (trimmed)
        body: String,
    },
}

/// Sends one reply message for a reply token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Send `message` as the reply to the event identified by `token`.
    async fn send(&self, token: &ReplyToken, message: &OutboundMessage) -> Result<(), ReplyError>;
}

/// LINE Messaging API reply client.
pub struct LineReplyClient {
    client: HttpClient,
    endpoint: String,
    access_token: String,
}

impl LineReplyClient {
    /// Create a client for the given endpoint and channel access token.
    #[must_use]
    pub fn new(endpoint: &str, access_token: &str, timeout: Duration) -> Self {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            client,
            endpoint: endpoint.to_string(),
            access_token: access_token.to_string(),
        }
    }
}

#[async_trait]
impl ReplySender for LineReplyClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn send(&self, token: &ReplyToken, message: &OutboundMessage) -> Result<(), ReplyError> {
        let payload = ReplyPayload::single(token.as_str(), message);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ReplyError::Network(e.to_string()))?;

        let status = response.status();
        let headers = format!("{:?}", response.headers());
        let body = response.text().await.unwrap_or_default();
        info!(
            status = status.as_u16(),
            headers = %headers,
            content = %body,
            "Reply response"
        );

        if status.is_success() {
            Ok(())
        } else {
            Err(ReplyError::Status {
                status: status.as_u16(),
                body: clean_error_body(&body),
            })
        }
    }
}
