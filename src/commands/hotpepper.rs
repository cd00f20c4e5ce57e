//! Hotpepper gourmet search adapter.
//!
//! Picks one random shop matching the query and credits the service.

use crate::bot::message::OutboundMessage;
use crate::bot::registry::CommandHandler;
use crate::commands::{CommandError, NO_RESULTS};
use crate::config::Settings;
use crate::http::get_json;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::debug;

/// Attribution line required by the Hotpepper Webservice terms.
pub const ATTRIBUTION: &str = "\u{3000}\u{3000}Powered by ホットペッパー Webサービス";

/// Large service area code for Kanto.
const SERVICE_AREA_KANTO: &str = "SS10";
/// Genre code for izakaya.
const GENRE_IZAKAYA: &str = "G001";
/// Search radius code for 1000m.
const RANGE_NARROW: &str = "3";
/// Search radius code for 3000m.
const RANGE_WIDE: &str = "5";

/// Which kind of search a command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchVariant {
    /// Shops open for lunch, narrow radius
    Lunch,
    /// Any shop; izakaya when no keyword is given
    Izakaya,
}

#[derive(Debug, Deserialize)]
struct GourmetResponse {
    #[serde(default)]
    results: GourmetResults,
}

#[derive(Debug, Default, Deserialize)]
struct GourmetResults {
    #[serde(default)]
    shop: Vec<Shop>,
}

/// A shop entry of the search result.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Shop {
    /// Shop name
    pub name: String,
    /// Shop URLs
    pub urls: ShopUrls,
}

/// URLs of a shop.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ShopUrls {
    /// PC site URL
    pub pc: String,
}

/// Restaurant search command.
pub struct GourmetSearch {
    client: HttpClient,
    endpoint: String,
    api_key: String,
    default_lat: String,
    default_lng: String,
    variant: SearchVariant,
}

impl GourmetSearch {
    /// Create a search command from settings.
    #[must_use]
    pub fn new(client: HttpClient, settings: &Settings, variant: SearchVariant) -> Self {
        Self {
            client,
            endpoint: settings.hotpepper_url.clone(),
            api_key: settings.hotpepper_api_key.clone(),
            default_lat: settings.default_lat.clone(),
            default_lng: settings.default_lng.clone(),
            variant,
        }
    }

    /// Query parameters for the given arguments.
    ///
    /// Zero or one argument searches around the default coordinates;
    /// any arguments are joined into one keyword. Two or more narrow the
    /// radius for the izakaya search.
    #[must_use]
    pub fn build_query(&self, args: &[String]) -> Vec<(&'static str, String)> {
        let range = match self.variant {
            SearchVariant::Lunch => RANGE_NARROW,
            SearchVariant::Izakaya if args.len() >= 2 => RANGE_NARROW,
            SearchVariant::Izakaya => RANGE_WIDE,
        };

        let mut query = vec![
            ("key", self.api_key.clone()),
            ("large_service_area", SERVICE_AREA_KANTO.to_string()),
            ("range", range.to_string()),
            ("order", "2".to_string()),
            ("type", "lite".to_string()),
            ("format", "json".to_string()),
            ("count", "100".to_string()),
        ];

        if self.variant == SearchVariant::Lunch {
            query.push(("lunch", "1".to_string()));
        }

        if args.len() <= 1 {
            query.push(("lat", self.default_lat.clone()));
            query.push(("lng", self.default_lng.clone()));
            if args.is_empty() && self.variant == SearchVariant::Izakaya {
                query.push(("genre", GENRE_IZAKAYA.to_string()));
            }
        }

        if !args.is_empty() {
            query.push(("keyword", args.join(" ")));
        }

        query
    }
}

/// Format the reply for a search result set.
#[must_use]
pub fn format_shops(shops: &[Shop]) -> String {
    let head = shops.choose(&mut rand::thread_rng()).map_or_else(
        || format!("{NO_RESULTS}\n"),
        |shop| format!("{}\n{}\n", shop.name, shop.urls.pc),
    );
    format!("{head}{ATTRIBUTION}")
}

#[async_trait]
impl CommandHandler for GourmetSearch {
    async fn handle(&self, args: &[String]) -> Result<Option<OutboundMessage>, CommandError> {
        let query = self.build_query(args);
        let response: GourmetResponse = get_json(&self.client, &self.endpoint, &query).await?;

        debug!(
            variant = ?self.variant,
            shops = response.results.shop.len(),
            "Hotpepper search finished"
        );

        Ok(Some(OutboundMessage::text(format_shops(
            &response.results.shop,
        ))))
    }
}
