//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! the fixed endpoints and constants used by the command adapters.

use chrono::{FixedOffset, Offset, Utc};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// LINE Messaging API reply endpoint
pub const LINE_REPLY_URL: &str = "https://api.line.me/v2/bot/message/reply";
/// Hotpepper gourmet search API
pub const HOTPEPPER_URL: &str = "http://webservice.recruit.co.jp/hotpepper/gourmet/v1/";
/// Qiita items API
pub const QIITA_URL: &str = "https://qiita.com/api/v2/items";
/// JPCERT/CC alert listing
pub const JPCERT_URL: &str = "https://www.jpcert.or.jp/at/";
/// Security news listing
pub const SECNEWS_URL: &str = "https://www.security-next.com/category/cat191";
/// JPCERT/CC weekly report listing
pub const WEEKLY_URL: &str = "https://www.jpcert.or.jp/wr/";

/// Browser-like user agent sent with every outbound data request
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/79.0.3945.88 Safari/537.36";

/// Fixed acknowledgment text returned to the webhook caller
pub const ACK_TEXT: &str = "これはテストです";

/// Application settings loaded from config files and environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// LINE channel access token used for the reply endpoint
    pub access_token: String,

    /// Hotpepper Webservice API key
    #[serde(rename = "hotpepper", default)]
    pub hotpepper_api_key: String,

    /// Default latitude for location-less restaurant searches
    #[serde(default)]
    pub default_lat: String,
    /// Default longitude for location-less restaurant searches
    #[serde(default)]
    pub default_lng: String,

    /// Address the webhook server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Reply endpoint of the chat platform
    #[serde(default = "default_line_reply_url")]
    pub line_reply_url: String,
    /// Hotpepper gourmet search endpoint
    #[serde(default = "default_hotpepper_url")]
    pub hotpepper_url: String,
    /// Qiita items endpoint
    #[serde(default = "default_qiita_url")]
    pub qiita_url: String,
    /// JPCERT/CC alert page
    #[serde(default = "default_jpcert_url")]
    pub jpcert_url: String,
    /// Security news page
    #[serde(default = "default_secnews_url")]
    pub secnews_url: String,
    /// Weekly report page
    #[serde(default = "default_weekly_url")]
    pub weekly_url: String,

    /// Offset from UTC (hours) used to decide "today"
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Timeout for outbound HTTP calls
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_line_reply_url() -> String {
    LINE_REPLY_URL.to_string()
}

fn default_hotpepper_url() -> String {
    HOTPEPPER_URL.to_string()
}

fn default_qiita_url() -> String {
    QIITA_URL.to_string()
}

fn default_jpcert_url() -> String {
    JPCERT_URL.to_string()
}

fn default_secnews_url() -> String {
    SECNEWS_URL.to_string()
}

fn default_weekly_url() -> String {
    WEEKLY_URL.to_string()
}

const fn default_utc_offset_hours() -> i32 {
    9
}

const fn default_http_timeout_secs() -> u64 {
    10
}

/// Build the layered configuration source.
///
/// # Errors
///
/// Returns a `ConfigError` if a present source cannot be read.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, not checked into git
        .add_source(File::with_name("config/local").required(false))
        // Eg.. `APP_BIND_ADDR=127.0.0.1:3000` sets `bind_addr`
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Plain variables (`ACCESS_TOKEN`, `HOTPEPPER`, ...); empty ones count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use line_command_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or `access_token` is missing.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Settings with every optional value at its default.
    #[must_use]
    pub fn with_access_token(access_token: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
            hotpepper_api_key: String::new(),
            default_lat: String::new(),
            default_lng: String::new(),
            bind_addr: default_bind_addr(),
            line_reply_url: default_line_reply_url(),
            hotpepper_url: default_hotpepper_url(),
            qiita_url: default_qiita_url(),
            jpcert_url: default_jpcert_url(),
            secnews_url: default_secnews_url(),
            weekly_url: default_weekly_url(),
            utc_offset_hours: default_utc_offset_hours(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }

    /// Timezone used for "today"/"yesterday" comparisons.
    ///
    /// Out-of-range offsets fall back to UTC+9.
    #[must_use]
    pub fn timezone(&self) -> FixedOffset {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .or_else(|| FixedOffset::east_opt(default_utc_offset_hours() * 3600))
            .unwrap_or_else(|| Utc.fix())
    }

    /// Timeout applied to outbound HTTP calls.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Single test touches the environment to avoid races between test threads
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("ACCESS_TOKEN", "dummy_token");
        env::set_var("HOTPEPPER", "hp_key");
        env::set_var("DEFAULT_LAT", "35.681");
        env::set_var("UTC_OFFSET_HOURS", "0");
        env::set_var("QIITA_URL", "");

        let settings = Settings::new()?;
        assert_eq!(settings.access_token, "dummy_token");
        assert_eq!(settings.hotpepper_api_key, "hp_key");
        assert_eq!(settings.default_lat, "35.681");
        assert_eq!(settings.default_lng, "");
        assert_eq!(settings.utc_offset_hours, 0);
        // Empty variables are ignored, so the default endpoint survives
        assert_eq!(settings.qiita_url, QIITA_URL);
        assert_eq!(settings.bind_addr, "0.0.0.0:8080");

        for key in [
            "ACCESS_TOKEN",
            "HOTPEPPER",
            "DEFAULT_LAT",
            "UTC_OFFSET_HOURS",
            "QIITA_URL",
        ] {
            env::remove_var(key);
        }
        Ok(())
    }

    #[test]
    fn test_timezone_defaults_to_jst() {
        let settings = Settings::with_access_token("t");
        assert_eq!(settings.timezone().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_timezone_out_of_range_falls_back() {
        let mut settings = Settings::with_access_token("t");
        settings.utc_offset_hours = 48;
        assert_eq!(settings.timezone().local_minus_utc(), 9 * 3600);

        settings.utc_offset_hours = -5;
        assert_eq!(settings.timezone().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_http_timeout() {
        let mut settings = Settings::with_access_token("t");
        settings.http_timeout_secs = 3;
        assert_eq!(settings.http_timeout(), Duration::from_secs(3));
    }
}
