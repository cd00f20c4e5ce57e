//! Listing page scrapers.
//!
//! A shared engine that reads dated entries from an HTML listing page.
//! Each site is described by its own [`SelectorContract`]; changing one
//! site's contract does not affect the others.

use crate::bot::message::OutboundMessage;
use crate::bot::registry::CommandHandler;
use crate::commands::{CommandError, NOTHING_FOUND};
use crate::http::get_text;
use crate::utils::today_in;
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};
use reqwest::{Client as HttpClient, Url};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Where the pieces of one entry live on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorContract {
    /// Selector matching one entry
    pub item: &'static str,
    /// Selector (inside an entry) of the element holding the date
    pub date: &'static str,
    /// Selector (inside an entry) of the anchor with title and href
    pub link: &'static str,
    /// chrono format of the date text; trailing text is ignored
    pub date_format: &'static str,
}

impl SelectorContract {
    /// JPCERT/CC alert list.
    #[must_use]
    pub const fn jpcert() -> Self {
        Self {
            item: "div.contents ul.list li",
            date: "span.date",
            link: "a",
            date_format: "%Y-%m-%d",
        }
    }

    /// Security NEXT news list.
    #[must_use]
    pub const fn security_next() -> Self {
        Self {
            item: "div.content article",
            date: "time",
            link: "h2 a",
            date_format: "%Y/%m/%d",
        }
    }

    /// JPCERT/CC weekly report list.
    #[must_use]
    pub const fn jpcert_weekly() -> Self {
        Self {
            item: "div.contents ul.wr_list li",
            date: "span.date",
            link: "a",
            date_format: "%Y-%m-%d",
        }
    }
}

/// One dated entry of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    /// Publication date
    pub date: NaiveDate,
    /// Entry title
    pub title: String,
    /// Absolute entry URL
    pub url: String,
}

fn compile(selector: &str) -> Result<Selector, CommandError> {
    Selector::parse(selector)
        .map_err(|e| CommandError::Config(format!("invalid selector {selector:?}: {e}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract entries from a listing page in document order.
///
/// Entries missing a parseable date or a link are skipped.
///
/// # Errors
///
/// Returns `CommandError::Config` if a selector of the contract is invalid.
pub fn parse_listing(
    html: &str,
    contract: &SelectorContract,
    base: &Url,
) -> Result<Vec<ListingItem>, CommandError> {
    let item_selector = compile(contract.item)?;
    let date_selector = compile(contract.date)?;
    let link_selector = compile(contract.link)?;

    let document = Html::parse_document(html);
    let items = document
        .select(&item_selector)
        .filter_map(|item| {
            let date_text = element_text(item.select(&date_selector).next()?);
            let (date, _) =
                NaiveDate::parse_and_remainder(&date_text, contract.date_format).ok()?;

            let link = item.select(&link_selector).next()?;
            let href = link.value().attr("href")?;
            let url = base.join(href).ok()?;

            Some(ListingItem {
                date,
                title: element_text(link),
                url: url.to_string(),
            })
        })
        .collect();

    Ok(items)
}

/// Entries published today or yesterday.
#[must_use]
pub fn filter_recent(items: Vec<ListingItem>, today: NaiveDate) -> Vec<ListingItem> {
    let yesterday = today.pred_opt();
    items
        .into_iter()
        .filter(|item| item.date == today || Some(item.date) == yesterday)
        .collect()
}

/// `date title\nurl` lines, or the neutral message when empty.
#[must_use]
pub fn format_listing(items: &[ListingItem]) -> String {
    if items.is_empty() {
        return NOTHING_FOUND.to_string();
    }
    items
        .iter()
        .map(|item| format!("{} {}\n{}", item.date.format("%Y/%m/%d"), item.title, item.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Command that reports today's and yesterday's entries of one site.
pub struct ListingScraper {
    client: HttpClient,
    page_url: String,
    contract: SelectorContract,
    tz: FixedOffset,
}

impl ListingScraper {
    /// Create a scraper for one listing page.
    #[must_use]
    pub fn new(
        client: HttpClient,
        page_url: &str,
        contract: SelectorContract,
        tz: FixedOffset,
    ) -> Self {
        Self {
            client,
            page_url: page_url.to_string(),
            contract,
            tz,
        }
    }

    /// Reply text for a fetched page as of `today`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Config` if the page URL or a selector is invalid.
    pub fn reply_for(&self, html: &str, today: NaiveDate) -> Result<String, CommandError> {
        let base = Url::parse(&self.page_url)
            .map_err(|e| CommandError::Config(format!("invalid page url: {e}")))?;
        let items = parse_listing(html, &self.contract, &base)?;
        let total = items.len();
        let recent = filter_recent(items, today);

        debug!(
            page = %self.page_url,
            total,
            recent = recent.len(),
            "Listing scraped"
        );
        Ok(format_listing(&recent))
    }
}

#[async_trait]
impl CommandHandler for ListingScraper {
    async fn handle(&self, _args: &[String]) -> Result<Option<OutboundMessage>, CommandError> {
        let html = get_text(&self.client, &self.page_url, &[]).await?;
        let text = self.reply_for(&html, today_in(self.tz))?;
        Ok(Some(OutboundMessage::text(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const JPCERT_PAGE: &str = r#"
        <html><body><div class="contents">
          <ul class="list">
            <li><span class="date">2026-10-19</span>
                <a href="/at/2026/at260019.html">Microsoft 製品の脆弱性に関する注意喚起</a></li>
            <li><span class="date">2026-10-18 更新</span>
                <a href="https://www.jpcert.or.jp/at/2026/at260018.html">Apache HTTP Server の脆弱性</a></li>
            <li><span class="date">2026-10-10</span>
                <a href="/at/2026/at260010.html">古い注意喚起</a></li>
            <li><span class="date">日付なし</span><a href="/at/x.html">壊れた行</a></li>
            <li><span class="date">2026-10-19</span>リンクなし</li>
          </ul>
        </div></body></html>
    "#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn base() -> Url {
        Url::parse("https://www.jpcert.or.jp/at/").expect("valid url")
    }

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).expect("valid offset")
    }

    #[test]
    fn test_parse_listing_skips_incomplete_entries() {
        let items =
            parse_listing(JPCERT_PAGE, &SelectorContract::jpcert(), &base()).expect("parses");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Microsoft 製品の脆弱性に関する注意喚起");
        assert_eq!(items[0].url, "https://www.jpcert.or.jp/at/2026/at260019.html");
        assert_eq!(items[1].date, date(2026, 10, 18));
    }

    #[test]
    fn test_filter_today_and_yesterday() {
        let items =
            parse_listing(JPCERT_PAGE, &SelectorContract::jpcert(), &base()).expect("parses");
        let recent = filter_recent(items, date(2026, 10, 19));
        assert_eq!(recent.len(), 2);

        let items =
            parse_listing(JPCERT_PAGE, &SelectorContract::jpcert(), &base()).expect("parses");
        assert!(filter_recent(items, date(2026, 11, 1)).is_empty());
    }

    #[test]
    fn test_reply_for_formats_matches() {
        let scraper = ListingScraper::new(
            crate::http::create_http_client(Duration::from_secs(1)),
            "https://www.jpcert.or.jp/at/",
            SelectorContract::jpcert(),
            jst(),
        );
        let text = scraper
            .reply_for(JPCERT_PAGE, date(2026, 10, 19))
            .expect("reply");
        assert_eq!(
            text,
            "2026/10/19 Microsoft 製品の脆弱性に関する注意喚起\nhttps://www.jpcert.or.jp/at/2026/at260019.html\n\
             2026/10/18 Apache HTTP Server の脆弱性\nhttps://www.jpcert.or.jp/at/2026/at260018.html"
        );
    }

    #[test]
    fn test_changed_layout_reports_nothing_found() {
        let scraper = ListingScraper::new(
            crate::http::create_http_client(Duration::from_secs(1)),
            "https://www.jpcert.or.jp/at/",
            SelectorContract::jpcert(),
            jst(),
        );
        let text = scraper
            .reply_for("<html><body><p>メンテナンス中</p></body></html>", date(2026, 10, 19))
            .expect("reply");
        assert_eq!(text, "該当する情報はありません");
    }

    #[test]
    fn test_contracts_are_independent() {
        let page = r#"<div class="content">
            <article><time>2026/10/19</time><h2><a href="/151234">ランサムウェア被害を公表</a></h2></article>
        </div>"#;
        let base = Url::parse("https://www.security-next.com/").expect("valid url");

        let items =
            parse_listing(page, &SelectorContract::security_next(), &base).expect("parses");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://www.security-next.com/151234");

        // The same page yields nothing under another site's contract
        let items = parse_listing(page, &SelectorContract::jpcert(), &base).expect("parses");
        assert!(items.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let contract = SelectorContract {
            item: "ul[",
            ..SelectorContract::jpcert()
        };
        assert!(matches!(
            parse_listing("<ul></ul>", &contract, &base()),
            Err(CommandError::Config(_))
        ));
    }
}
