//! HTTP utilities for command adapters
//!
//! Provides the shared outbound client and the GET helpers every
//! data-source adapter goes through.

use crate::commands::CommandError;
use crate::config::USER_AGENT;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT as USER_AGENT_HEADER};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Maximum number of characters of an error body kept in error messages.
const ERROR_BODY_LIMIT: usize = 500;

/// Creates the HTTP client used for third-party data calls.
///
/// Every request carries the fixed browser-like `User-Agent`.
#[must_use]
pub fn create_http_client(timeout: Duration) -> HttpClient {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT));

    HttpClient::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Sends a GET request with query parameters and parses the JSON body.
///
/// # Errors
///
/// Returns `CommandError::Network` on connectivity issues,
/// `CommandError::Status` on non-success status codes,
/// or `CommandError::Decode` if the body is not the expected JSON.
pub async fn get_json<T: DeserializeOwned>(
    client: &HttpClient,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, CommandError> {
    let body = get_text(client, url, query).await?;
    serde_json::from_str(&body).map_err(|e| CommandError::Decode(e.to_string()))
}

/// Sends a GET request with query parameters and returns the body as text.
///
/// # Errors
///
/// Returns `CommandError::Network` on connectivity issues or
/// `CommandError::Status` on non-success status codes.
pub async fn get_text(
    client: &HttpClient,
    url: &str,
    query: &[(&str, String)],
) -> Result<String, CommandError> {
    debug!(url = %url, params = query.len(), "Outbound GET");

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| CommandError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(CommandError::Status {
            status: status.as_u16(),
            body: clean_error_body(&error_text),
        });
    }

    response
        .text()
        .await
        .map_err(|e| CommandError::Network(e.to_string()))
}

/// Reduces an error body to something fit for a log line.
pub(crate) fn clean_error_body(error_text: &str) -> String {
    let trimmed = error_text.trim_start();
    // Proxies answer with HTML error pages
    if trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html") || trimmed.starts_with("<HTML")
    {
        return "(server returned HTML error page)".to_string();
    }

    if error_text.chars().count() > ERROR_BODY_LIMIT {
        format!(
            "{}... (truncated)",
            crate::utils::truncate_str(error_text, ERROR_BODY_LIMIT)
        )
    } else {
        error_text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_error_body_html() {
        let body = "<!DOCTYPE html><html><body>502</body></html>";
        assert_eq!(clean_error_body(body), "(server returned HTML error page)");
    }

    #[test]
    fn test_clean_error_body_truncates() {
        let body = "あ".repeat(600);
        let cleaned = clean_error_body(&body);
        assert!(cleaned.ends_with("... (truncated)"));
        assert_eq!(cleaned.chars().count(), 500 + "... (truncated)".len());
    }

    #[test]
    fn test_clean_error_body_passthrough() {
        assert_eq!(clean_error_body("{\"error\":1}"), "{\"error\":1}");
    }
}
