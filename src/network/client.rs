//! HTTP client for querying the upstream server

use crate::error::ForwardError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Standard accept header for JSON requests
const ACCEPT_JSON: &str = "application/json,text/javascript,*/*;q=0.01";

/// HTTP client wrapper issuing the single upstream request
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, ForwardError> {
        let client = Client::builder()
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ForwardError::Unexpected(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: format!("http-query-forwarder/{}", crate::VERSION),
        })
    }

    /// GET `url` and return its body as a JSON array
    pub async fn get_json_array(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Vec<Value>, ForwardError> {
        debug!("GET {} (timeout {:?})", url, timeout);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .header("User-Agent", &self.user_agent)
            .header("Accept", ACCEPT_JSON)
            .send()
            .await
            .map_err(|e| Self::transport_error(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Network(format!("HTTP error: {}", status)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Self::transport_error(e, url))?;
        debug!("Received {} bytes with status {}", text.len(), status.as_u16());

        parse_array(&text)
    }

    /// Map a transport failure, naming the attempted URL on timeouts
    fn transport_error(err: reqwest::Error, url: &str) -> ForwardError {
        if err.is_timeout() {
            return ForwardError::Timeout {
                url: url.to_string(),
            };
        }
        ForwardError::from(err)
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Parse a body that must be a JSON array
pub fn parse_array(text: &str) -> Result<Vec<Value>, ForwardError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(items),
        other => Err(ForwardError::Data(format!(
            "Server response is not a JSON list (got {})",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
        assert!(client.unwrap().user_agent().starts_with("http-query-forwarder/"));
    }

    #[test]
    fn test_parse_array() {
        assert_eq!(parse_array("[1, 2]").unwrap().len(), 2);
        assert!(matches!(parse_array("{\"a\": 1}"), Err(ForwardError::Data(_))));
        assert!(matches!(parse_array("<html>"), Err(ForwardError::Data(_))));
    }

    #[tokio::test]
    async fn test_get_json_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "a b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "Title": "A" }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/search?q=a+b", server.uri());
        let items = client
            .get_json_array(&url, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(items, vec![json!({ "Title": "A" })]);
    }

    #[tokio::test]
    async fn test_error_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let result = client
            .get_json_array(&server.uri(), Duration::from_secs(5))
            .await;
        match result {
            Err(ForwardError::Network(message)) => assert!(message.contains("500")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/?q=x", server.uri());
        let result = client
            .get_json_array(&url, Duration::from_millis(200))
            .await;
        match result {
            Err(ForwardError::Timeout { url: attempted }) => assert_eq!(attempted, url),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = HttpClient::new().unwrap();
        let result = client
            .get_json_array("http://127.0.0.1:1/?q=x", Duration::from_secs(2))
            .await;
        assert!(matches!(result, Err(ForwardError::Network(_))));
    }
}
