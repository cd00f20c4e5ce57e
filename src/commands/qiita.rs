//! Qiita latest articles adapter.

use crate::bot::message::OutboundMessage;
use crate::bot::registry::CommandHandler;
use crate::commands::{CommandError, NO_RESULTS};
use crate::http::get_text;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::warn;

/// Number of articles fetched per request
pub const ARTICLE_COUNT: usize = 3;

/// One article of the feed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Article {
    /// Article title
    pub title: String,
    /// Article URL
    pub url: String,
}

/// Latest-articles command.
pub struct QiitaFeed {
    client: HttpClient,
    endpoint: String,
}

impl QiitaFeed {
    /// Create the command for an items endpoint.
    #[must_use]
    pub fn new(client: HttpClient, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }
}

/// Decode a feed body. Anything other than an array of articles (an
/// error object, truncated JSON) yields an empty feed.
#[must_use]
pub fn parse_feed(body: &str) -> Vec<Article> {
    serde_json::from_str(body).unwrap_or_else(|e| {
        warn!(error = %e, "Unexpected Qiita response shape");
        Vec::new()
    })
}

/// `title\nurl` pairs joined by newlines, in feed order.
#[must_use]
pub fn format_articles(articles: &[Article]) -> String {
    if articles.is_empty() {
        return NO_RESULTS.to_string();
    }
    articles
        .iter()
        .map(|a| format!("{}\n{}", a.title, a.url))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl CommandHandler for QiitaFeed {
    async fn handle(&self, _args: &[String]) -> Result<Option<OutboundMessage>, CommandError> {
        let query = [
            ("page", "1".to_string()),
            ("per_page", ARTICLE_COUNT.to_string()),
        ];
        let body = get_text(&self.client, &self.endpoint, &query).await?;
        Ok(Some(OutboundMessage::text(format_articles(&parse_feed(&body)))))
    }
}
