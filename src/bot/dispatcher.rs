//! Command dispatch.
//!
//! Maps a raw command line to the matching handler and classifies the
//! result so the webhook edge can log each outcome distinctly.

use crate::bot::help::render_help;
use crate::bot::message::OutboundMessage;
use crate::bot::registry::{CommandRegistry, HELP_KEYWORD};
use crate::commands::CommandError;
use crate::utils::tokenize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Why a request produced no reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoReply {
    /// Command line was empty or whitespace only
    EmptyText,
    /// First token is not a registered command
    UnknownCommand(String),
    /// Handler ran and chose not to reply
    Declined(String),
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Send this message back
    Reply(OutboundMessage),
    /// Nothing to send
    NoReply(NoReply),
}

/// Handler failure during dispatch
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The matched command failed talking to its data source
    #[error("command `{command}` failed: {source}")]
    Upstream {
        /// Name of the failing command
        command: String,
        /// Underlying adapter error
        #[source]
        source: CommandError,
    },
}

/// Routes command lines to registered handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a finished registry.
    #[must_use]
    pub const fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatch one command line.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Upstream` if the matched handler fails.
    #[instrument(skip_all, fields(text = %raw_text))]
    pub async fn dispatch(&self, raw_text: &str) -> Result<DispatchOutcome, DispatchError> {
        let tokens = tokenize(raw_text);
        let Some((name, args)) = tokens.split_first() else {
            return Ok(DispatchOutcome::NoReply(NoReply::EmptyText));
        };

        if name == HELP_KEYWORD {
            debug!("Rendering command listing");
            return Ok(DispatchOutcome::Reply(render_help(&self.registry)));
        }

        let Some(command) = self.registry.get(name) else {
            debug!(command = %name, "No matching command");
            return Ok(DispatchOutcome::NoReply(NoReply::UnknownCommand(
                name.clone(),
            )));
        };

        info!(command = %name, params = ?args, "Invoking command");
        match command.handler().handle(args).await {
            Ok(Some(message)) => Ok(DispatchOutcome::Reply(message)),
            Ok(None) => Ok(DispatchOutcome::NoReply(NoReply::Declined(name.clone()))),
            Err(source) => Err(DispatchError::Upstream {
                command: name.clone(),
                source,
            }),
        }
    }
}
