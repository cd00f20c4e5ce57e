//! Command adapters.
//!
//! Each adapter fetches from one external data source and formats the
//! reply text. Adapters are independent of each other; they only share
//! the HTTP client and the error type.

/// Hotpepper gourmet search (`lunch`, `nomitai`)
pub mod hotpepper;
/// Qiita latest articles (`qiita`)
pub mod qiita;
/// Date-filtered listing scrapers (`jpcert`, `secnews`)
pub mod scrape;
/// Weekly report notifier (`weekly`)
pub mod weekly;

use crate::bot::registry::{CommandRegistry, RegistryError};
use crate::config::Settings;
use crate::http::create_http_client;
use std::sync::Arc;
use thiserror::Error;

pub use hotpepper::{GourmetSearch, SearchVariant};
pub use qiita::QiitaFeed;
pub use scrape::{ListingScraper, SelectorContract};
pub use weekly::WeeklyReport;

/// Neutral reply when a search has nothing to show
pub const NO_RESULTS: &str = "検索結果がありません";
/// Neutral reply when a scraper finds nothing for today/yesterday
pub const NOTHING_FOUND: &str = "該当する情報はありません";

/// Errors raised by command adapters
#[derive(Debug, Error)]
pub enum CommandError {
    /// Data source unreachable or connection dropped
    #[error("network error: {0}")]
    Network(String),
    /// Data source answered with a non-success status
    #[error("upstream returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (trimmed)
        body: String,
    },
    /// Body could not be decoded into the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
    /// Adapter is misconfigured (e.g. invalid selector)
    #[error("configuration error: {0}")]
    Config(String),
}

/// Documentation of each built-in command; the first sentence is its title.
pub mod docs {
    /// `lunch`
    pub const LUNCH: &str = "ランチ営業店舗検索.

        lunchコマンドの後にスペース区切りで二つ以上キーワードを入力すると場所での検索も可能です。
        一つの場合はデフォルト座標付近での検索となります。
        ";
    /// `nomitai`
    pub const NOMITAI: &str = "居酒屋検索.

        nomitaiコマンドの後にスペース区切りで二つ以上キーワードを入力すると場所での検索も可能です。
        一つの場合はデフォルト座標付近での検索となります。
        ";
    /// `qiita`
    pub const QIITA: &str = "Qiita新着記事取得.

        qiitaコマンドでQiitaの新着記事を3件取得します。
        ";
    /// `jpcert`
    pub const JPCERT: &str = "JPCERT/CC注意喚起.

        jpcertコマンドで今日と昨日に公開された注意喚起を取得します。
        ";
    /// `secnews`
    pub const SECNEWS: &str = "セキュリティニュース.

        secnewsコマンドで今日と昨日のセキュリティ関連ニュースを取得します。
        ";
    /// `weekly`
    pub const WEEKLY: &str = "JPCERT/CC Weekly Report.

        weeklyコマンドで本日発行のWeekly Reportを通知します。
        本日発行分がない場合は何も返しません。
        ";
}

/// Build the registry of built-in commands from settings.
///
/// # Errors
///
/// Returns `RegistryError` if two adapters claim the same name.
pub fn default_registry(settings: &Settings) -> Result<CommandRegistry, RegistryError> {
    let client = create_http_client(settings.http_timeout());
    let tz = settings.timezone();

    let mut registry = CommandRegistry::new();
    registry
        .register(
            "lunch",
            docs::LUNCH,
            Arc::new(GourmetSearch::new(client.clone(), settings, SearchVariant::Lunch)),
        )?
        .register(
            "nomitai",
            docs::NOMITAI,
            Arc::new(GourmetSearch::new(client.clone(), settings, SearchVariant::Izakaya)),
        )?
        .register(
            "qiita",
            docs::QIITA,
            Arc::new(QiitaFeed::new(client.clone(), &settings.qiita_url)),
        )?
        .register(
            "jpcert",
            docs::JPCERT,
            Arc::new(ListingScraper::new(
                client.clone(),
                &settings.jpcert_url,
                SelectorContract::jpcert(),
                tz,
            )),
        )?
        .register(
            "secnews",
            docs::SECNEWS,
            Arc::new(ListingScraper::new(
                client.clone(),
                &settings.secnews_url,
                SelectorContract::security_next(),
                tz,
            )),
        )?
        .register(
            "weekly",
            docs::WEEKLY,
            Arc::new(WeeklyReport::new(client, &settings.weekly_url, tz)),
        )?;

    Ok(registry)
}
