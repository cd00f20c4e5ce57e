//! Weekly report notifier.
//!
//! Replies only on the day the latest report is published.

use crate::bot::message::OutboundMessage;
use crate::bot::registry::CommandHandler;
use crate::commands::scrape::{parse_listing, ListingItem, SelectorContract};
use crate::commands::CommandError;
use crate::http::get_text;
use crate::utils::today_in;
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};
use reqwest::{Client as HttpClient, Url};
use tracing::debug;

/// Weekly report command.
pub struct WeeklyReport {
    client: HttpClient,
    page_url: String,
    tz: FixedOffset,
}

impl WeeklyReport {
    /// Create the command for a report listing page.
    #[must_use]
    pub fn new(client: HttpClient, page_url: &str, tz: FixedOffset) -> Self {
        Self {
            client,
            page_url: page_url.to_string(),
            tz,
        }
    }

    /// The latest report, if it was published on `today`.
    ///
    /// A page that does not match the expected layout yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Config` if the page URL or a selector is invalid.
    pub fn todays_report(
        &self,
        html: &str,
        today: NaiveDate,
    ) -> Result<Option<ListingItem>, CommandError> {
        let base = Url::parse(&self.page_url)
            .map_err(|e| CommandError::Config(format!("invalid page url: {e}")))?;
        let Some(latest) = parse_listing(html, &SelectorContract::jpcert_weekly(), &base)?
            .into_iter()
            .max_by_key(|item| item.date)
        else {
            debug!(page = %self.page_url, "No weekly report entries");
            return Ok(None);
        };

        debug!(latest = %latest.date, today = %today, "Weekly report checked");
        Ok((latest.date == today).then_some(latest))
    }
}

#[async_trait]
impl CommandHandler for WeeklyReport {
    async fn handle(&self, _args: &[String]) -> Result<Option<OutboundMessage>, CommandError> {
        let html = get_text(&self.client, &self.page_url, &[]).await?;
        Ok(self
            .todays_report(&html, today_in(self.tz))?
            .map(|report| OutboundMessage::text(format!("{}\n{}", report.title, report.url))))
    }
}
