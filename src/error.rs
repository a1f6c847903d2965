//! Error taxonomy for a single forwarded query
//!
//! Every failure ends the invocation and is rendered as exactly one result
//! entry. Configuration problems never reach this type: malformed settings
//! are defaulted while they are parsed.

use crate::results::ResultEntry;
use thiserror::Error;

/// Maximum visible length of a network error message
const NETWORK_DETAIL_LEN: usize = 50;

/// Maximum visible length of any other error detail
const DETAIL_LEN: usize = 100;

/// Failure of a single query invocation
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The configured server address has no host
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    /// The request did not complete within the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Connection failure, unusable URL, redirect loop or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// The response was not JSON, or not a JSON array
    #[error("Invalid response: {0}")]
    Data(String),

    /// Anything else
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ForwardError {
    /// Render this failure as the single entry shown to the user
    pub fn into_entry(self, icon: &str) -> ResultEntry {
        let (title, subtitle) = match self {
            Self::Timeout { url } => (
                "Error: Request Timed Out",
                format!("Server at {} timed out", url),
            ),
            Self::Network(message) => (
                "Error: Network Request Failed",
                format!(
                    "Could not connect to server: {}",
                    truncate(&message, NETWORK_DETAIL_LEN)
                ),
            ),
            Self::Data(message) => (
                "Error: Invalid Server Response",
                truncate(&message, DETAIL_LEN),
            ),
            Self::InvalidAddress(address) => (
                "Error: Plugin Error",
                truncate(&format!("Invalid server address: {}", address), DETAIL_LEN),
            ),
            Self::Unexpected(_) => (
                "Error: Plugin Error",
                "Something went wrong, see the plugin log for details".to_string(),
            ),
        };

        ResultEntry::new(title, icon).with_subtitle(subtitle)
    }
}

impl From<reqwest::Error> for ForwardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let url = err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "unknown url".to_string());
            return Self::Timeout { url };
        }
        if err.is_decode() {
            return Self::Data(err.to_string());
        }
        if err.is_connect()
            || err.is_request()
            || err.is_status()
            || err.is_body()
            || err.is_redirect()
            || err.is_builder()
        {
            return Self::Network(err.to_string());
        }
        Self::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for ForwardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Data(err.to_string())
    }
}

/// Cut `text` to at most `max` characters
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
