#![deny(missing_docs)]
//! LINE command bot.
//!
//! A webhook service that maps chat commands to small data-source
//! adapters (restaurant search, article feed, security advisories) and
//! replies through the LINE Messaging API.

/// Command dispatch, registry, help listing and replies
pub mod bot;
/// Command adapters for external data sources
pub mod commands;
/// Configuration management
pub mod config;
/// Outbound HTTP helpers
pub mod http;
/// Webhook endpoint
pub mod server;
/// Utility functions
pub mod utils;
