//! Settings for the query forwarder
//!
//! The host hands settings over as a loose key/value mapping where values are
//! often strings even for numbers and booleans. Every key is parsed on its own
//! and falls back to its default when absent or malformed.

use serde_json::{Map, Value};
use tracing::debug;

/// Default server address
pub const DEFAULT_SERVER_ADDRESS: &str = "http://127.0.0.1";
/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;
/// Default request path
pub const DEFAULT_SERVER_PATH: &str = "/";
/// Default query parameter name
pub const DEFAULT_QUERY_PARAM_NAME: &str = "q";
/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 5;

/// Effective settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Server address, with or without scheme and port
    pub server_address: String,
    /// Port used when the address carries none (`None` omits it)
    pub server_port: Option<u16>,
    /// Request path, always starting with a single `/`
    pub server_path: String,
    /// Name of the query-string parameter carrying the query
    pub query_param_name: String,
    /// Percent-encode the query value
    pub url_encode_query: bool,
    /// Request timeout in seconds, always positive
    pub request_timeout: u64,
    /// Custom URL template, trimmed; empty means component-based URLs
    pub custom_url_template: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            server_port: Some(DEFAULT_SERVER_PORT),
            server_path: DEFAULT_SERVER_PATH.to_string(),
            query_param_name: DEFAULT_QUERY_PARAM_NAME.to_string(),
            url_encode_query: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            custom_url_template: String::new(),
        }
    }
}

impl Settings {
    /// Build settings from a raw mapping, defaulting each key independently
    pub fn from_map(raw: &Map<String, Value>) -> Self {
        let defaults = Self::default();

        let server_address = raw
            .get("server_address")
            .and_then(as_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.server_address);

        let server_port = match raw.get("server_port") {
            Some(value) => parse_port(value).unwrap_or(defaults.server_port),
            None => defaults.server_port,
        };

        let server_path = raw
            .get("server_path")
            .and_then(as_text)
            .map(|s| normalize_path(&s))
            .unwrap_or(defaults.server_path);

        let query_param_name = raw
            .get("query_param_name")
            .and_then(as_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.query_param_name);

        let url_encode_query = raw
            .get("url_encode_query")
            .and_then(parse_bool)
            .unwrap_or(defaults.url_encode_query);

        let request_timeout = raw
            .get("request_timeout")
            .and_then(parse_timeout)
            .unwrap_or(defaults.request_timeout);

        let custom_url_template = raw
            .get("custom_url_template")
            .and_then(as_text)
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.custom_url_template);

        Self {
            server_address,
            server_port,
            server_path,
            query_param_name,
            url_encode_query,
            request_timeout,
            custom_url_template,
        }
    }

    /// Build settings from any JSON value; non-objects yield defaults
    pub fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(map) => Self::from_map(map),
            None => {
                debug!("Settings value is not a mapping, using defaults");
                Self::default()
            }
        }
    }

    /// Merge with environment variables (HQF_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    /// Merge overrides supplied by `lookup`, parsed like file values
    pub fn merge_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HQF_SERVER_ADDRESS") {
            let val = val.trim();
            if !val.is_empty() {
                self.server_address = val.to_string();
            }
        }
        if let Some(val) = lookup("HQF_SERVER_PORT") {
            if let Some(port) = parse_port(&Value::String(val)) {
                self.server_port = port;
            }
        }
        if let Some(val) = lookup("HQF_REQUEST_TIMEOUT") {
            if let Some(timeout) = parse_timeout(&Value::String(val)) {
                self.request_timeout = timeout;
            }
        }
    }

    /// Whether a custom URL template overrides component-based URLs
    pub fn uses_template(&self) -> bool {
        !self.custom_url_template.is_empty()
    }

    /// Short description of the configured target, shown when idle
    pub fn describe_target(&self) -> String {
        if self.uses_template() {
            self.custom_url_template.clone()
        } else {
            self.server_address.clone()
        }
    }

    /// Default settings in the host's wire form, used to seed a new file
    pub fn default_document() -> Value {
        serde_json::json!({
            "server_address": DEFAULT_SERVER_ADDRESS,
            "server_port": DEFAULT_SERVER_PORT.to_string(),
            "server_path": DEFAULT_SERVER_PATH,
            "query_param_name": DEFAULT_QUERY_PARAM_NAME,
            "url_encode_query": true,
            "request_timeout": DEFAULT_REQUEST_TIMEOUT.to_string(),
            "custom_url_template": "",
        })
    }
}

/// Render a scalar as text; null, arrays and objects are rejected
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a port setting.
///
/// `Some(None)` means the port is deliberately empty and must be omitted,
/// `None` means the value is malformed.
fn parse_port(value: &Value) -> Option<Option<u16>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) => n
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .filter(|p| *p > 0)
            .map(Some),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(None);
            }
            s.parse::<u16>().ok().filter(|p| *p > 0).map(Some)
        }
        _ => None,
    }
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

fn parse_timeout(value: &Value) -> Option<u64> {
    let seconds = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    u64::try_from(seconds).ok().filter(|s| *s > 0)
}

/// Force a leading `/` and collapse repeated leading slashes
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('/');
    format!("/{}", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: Value) -> Settings {
        Settings::from_value(&value)
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server_address, "http://127.0.0.1");
        assert_eq!(settings.server_port, Some(8080));
        assert_eq!(settings.server_path, "/");
        assert_eq!(settings.query_param_name, "q");
        assert!(settings.url_encode_query);
        assert_eq!(settings.request_timeout, 5);
        assert!(!settings.uses_template());
    }

    #[test]
    fn test_empty_mapping_is_default() {
        assert_eq!(settings(json!({})), Settings::default());
        assert_eq!(settings(json!("not a map")), Settings::default());
    }

    #[test]
    fn test_invalid_timeouts_fall_back() {
        for bad in [json!("0"), json!("-3"), json!("abc"), json!(0), json!(null), json!([5])] {
            let s = settings(json!({ "request_timeout": bad }));
            assert_eq!(s.request_timeout, 5);
        }
        assert_eq!(settings(json!({ "request_timeout": "12" })).request_timeout, 12);
        assert_eq!(settings(json!({ "request_timeout": 3 })).request_timeout, 3);
        assert_eq!(settings(json!({ "request_timeout": 2.7 })).request_timeout, 2);
    }

    #[test]
    fn test_bool_parsing() {
        assert!(!settings(json!({ "url_encode_query": "FALSE" })).url_encode_query);
        assert!(!settings(json!({ "url_encode_query": false })).url_encode_query);
        assert!(settings(json!({ "url_encode_query": "True" })).url_encode_query);
        assert!(settings(json!({ "url_encode_query": "maybe" })).url_encode_query);
    }

    #[test]
    fn test_port_parsing() {
        assert_eq!(settings(json!({ "server_port": "" })).server_port, None);
        assert_eq!(settings(json!({ "server_port": "9000" })).server_port, Some(9000));
        assert_eq!(settings(json!({ "server_port": 9001 })).server_port, Some(9001));
        assert_eq!(settings(json!({ "server_port": "abc" })).server_port, Some(8080));
        assert_eq!(settings(json!({ "server_port": "70000" })).server_port, Some(8080));
    }

    #[test]
    fn test_path_normalized() {
        assert_eq!(settings(json!({ "server_path": "search" })).server_path, "/search");
        assert_eq!(settings(json!({ "server_path": "//api/q" })).server_path, "/api/q");
        assert_eq!(settings(json!({ "server_path": "" })).server_path, "/");
    }

    #[test]
    fn test_blank_strings_default() {
        let s = settings(json!({ "server_address": "  ", "query_param_name": "" }));
        assert_eq!(s.server_address, DEFAULT_SERVER_ADDRESS);
        assert_eq!(s.query_param_name, DEFAULT_QUERY_PARAM_NAME);
    }

    #[test]
    fn test_template_trimmed() {
        let s = settings(json!({ "custom_url_template": "  http://x/y?{query}  " }));
        assert_eq!(s.custom_url_template, "http://x/y?{query}");
        assert!(s.uses_template());
        assert_eq!(s.describe_target(), "http://x/y?{query}");
    }

    #[test]
    fn test_env_overrides() {
        let mut s = Settings::default();
        s.merge_env_from(|key| match key {
            "HQF_SERVER_ADDRESS" => Some("10.0.0.2".to_string()),
            "HQF_SERVER_PORT" => Some("nope".to_string()),
            "HQF_REQUEST_TIMEOUT" => Some("9".to_string()),
            _ => None,
        });
        assert_eq!(s.server_address, "10.0.0.2");
        assert_eq!(s.server_port, Some(8080));
        assert_eq!(s.request_timeout, 9);
    }

    #[test]
    fn test_default_document_round_trips() {
        assert_eq!(Settings::from_value(&Settings::default_document()), Settings::default());
    }
}
