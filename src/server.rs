//! Webhook HTTP endpoint.
//!
//! Every request is answered with HTTP 200 and a fixed acknowledgment,
//! whatever happened while handling it. Outcomes are classified and
//! logged here.

use crate::bot::dispatcher::{DispatchError, DispatchOutcome, Dispatcher, NoReply};
use crate::bot::event::{EventError, InboundEvent, RequestContext};
use crate::bot::reply::{ReplyError, ReplySender};
use crate::config::ACK_TEXT;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// How one webhook request ended.
#[derive(Debug)]
pub enum WebhookOutcome {
    /// A reply was delivered
    Replied,
    /// Nothing needed sending
    NoReply(NoReply),
    /// Body was malformed
    ParseError(EventError),
    /// A command failed upstream
    UpstreamFailed(DispatchError),
    /// The reply could not be delivered
    ReplyFailed(ReplyError),
}

/// Shared state of the webhook endpoint.
pub struct AppState {
    dispatcher: Dispatcher,
    sender: Arc<dyn ReplySender>,
}

impl AppState {
    /// Create the state from a dispatcher and a reply sender.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, sender: Arc<dyn ReplySender>) -> Self {
        Self { dispatcher, sender }
    }

    /// Handle one webhook body end to end.
    ///
    /// Returns the reply token used (if the body carried one) and the
    /// classified outcome. Never fails.
    pub async fn process_webhook(&self, body: &[u8]) -> (Option<String>, WebhookOutcome) {
        let event = match InboundEvent::from_webhook(body) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Malformed webhook payload");
                let token = e.reply_token().map(ToString::to_string);
                return (token, WebhookOutcome::ParseError(e));
            }
        };

        let ctx = RequestContext::new(&event);
        let token = Some(ctx.reply_token.as_str().to_string());
        let span = info_span!("webhook", request_id = %ctx.request_id);
        let outcome = self.run(&ctx, &event.text).instrument(span).await;
        (token, outcome)
    }

    async fn run(&self, ctx: &RequestContext, text: &str) -> WebhookOutcome {
        let message = match self.dispatcher.dispatch(text).await {
            Ok(DispatchOutcome::Reply(message)) => message,
            Ok(DispatchOutcome::NoReply(reason)) => {
                debug!(reason = ?reason, "No reply");
                return WebhookOutcome::NoReply(reason);
            }
            Err(e) => {
                error!(error = %e, "Command failed");
                return WebhookOutcome::UpstreamFailed(e);
            }
        };

        match self.sender.send(&ctx.reply_token, &message).await {
            Ok(()) => {
                info!("Reply sent");
                WebhookOutcome::Replied
            }
            Err(e) => {
                error!(error = %e, "Reply failed");
                WebhookOutcome::ReplyFailed(e)
            }
        }
    }
}

/// Fixed acknowledgment body.
#[must_use]
pub fn ack_body(reply_token: &str) -> Value {
    json!({
        "replyToken": reply_token,
        "messages": [
            {
                "type": "text",
                "text": ACK_TEXT,
            }
        ],
    })
}

async fn callback(State(state): State<Arc<AppState>>, body: Bytes) -> Json<Value> {
    info!(bytes = body.len(), "Webhook received");
    let (token, outcome) = state.process_webhook(&body).await;
    debug!(outcome = ?outcome, "Webhook finished");
    Json(ack_body(token.as_deref().unwrap_or_default()))
}

async fn healthz() -> &'static str {
    "ok"
}

/// Build the HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/callback", post(callback))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Serve the webhook until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
