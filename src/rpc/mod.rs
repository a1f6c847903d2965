//! JSON-RPC envelope exchanged with the launcher host
//!
//! The host starts the plugin once per call and passes one request, either as
//! the first command-line argument or on stdin. `query` and `context_menu`
//! answer with a result list; callbacks answer only with host instructions.

use crate::actions::Host;
use crate::config::{self, FileSettings, HostSettings};
use crate::forwarder::QueryForwarder;
use crate::network::HttpClient;
use crate::results::{IconResolver, ResultEntry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use tracing::{debug, warn};

/// A request from the host
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub parameters: Vec<Value>,
    /// Settings injected by the host, when it manages them
    #[serde(default)]
    pub settings: Option<Value>,
}

impl Request {
    /// Parse a request from its JSON text
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text.trim()).context("malformed JSON-RPC request")
    }

    /// Read the request from the first argument, or stdin when there is none
    pub fn read<I>(mut args: I) -> Result<Self>
    where
        I: Iterator<Item = String>,
    {
        let text = match args.next() {
            Some(arg) => arg,
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read request from stdin")?;
                buf
            }
        };
        Self::parse(&text)
    }
}

/// A result-list answer
#[derive(Debug, Clone, Default, Serialize)]
pub struct Response {
    pub result: Vec<ResultEntry>,
}

impl Response {
    pub fn new(result: Vec<ResultEntry>) -> Self {
        Self { result }
    }
}

/// Build a forwarder with settings resolved for this request
pub fn forwarder_for(request: &Request) -> Result<QueryForwarder> {
    let host_settings = HostSettings::new(request.settings.as_ref());
    let settings = if request.settings.as_ref().map_or(false, Value::is_object) {
        config::resolve(&[&host_settings])
    } else {
        let file_settings = FileSettings::locate();
        config::resolve(&[&host_settings, &file_settings])
    };
    debug!("Effective settings: {:?}", settings);

    let client = HttpClient::new()?;
    let icons = IconResolver::new(config::plugin_dir());
    Ok(QueryForwarder::new(settings, client, icons))
}

/// Handle one request. `Some` carries a result list to print.
pub async fn handle(
    forwarder: &QueryForwarder,
    request: &Request,
    host: &dyn Host,
) -> Option<Response> {
    match request.method.as_str() {
        "query" => {
            let query = request
                .parameters
                .first()
                .and_then(Value::as_str)
                .unwrap_or_default();
            Some(Response::new(forwarder.query(query).await))
        }
        "context_menu" => {
            let payload = request.parameters.first().cloned().unwrap_or(Value::Null);
            Some(Response::new(forwarder.context_menu(&payload)))
        }
        method if forwarder.actions().contains(method) => {
            forwarder.invoke(method, &request.parameters, host);
            None
        }
        other => {
            warn!("Ignoring unknown method '{}'", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::RecordingHost;
    use crate::actions::HostInstruction;
    use crate::config::Settings;
    use serde_json::json;

    fn forwarder() -> QueryForwarder {
        QueryForwarder::new(
            Settings::default(),
            HttpClient::new().unwrap(),
            IconResolver::new("/opt/plugin"),
        )
    }

    #[test]
    fn test_parse_request() {
        let request = Request::parse(
            r#"{"method":"query","parameters":["cat"],"settings":{"server_port":"9000"}}"#,
        )
        .unwrap();
        assert_eq!(request.method, "query");
        assert_eq!(request.parameters, vec![json!("cat")]);
        assert!(request.settings.is_some());

        let request = Request::parse(r#"{"method":"context_menu"}"#).unwrap();
        assert!(request.parameters.is_empty());
        assert!(request.settings.is_none());

        assert!(Request::parse("not json").is_err());
    }

    #[test]
    fn test_read_from_argument() {
        let args = vec![r#"{"method":"query","parameters":[""]}"#.to_string()];
        let request = Request::read(args.into_iter()).unwrap();
        assert_eq!(request.method, "query");
    }

    #[test]
    fn test_response_wire_format() {
        let response = Response::new(vec![ResultEntry::new("A", "i").with_score(1)]);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "result": [{ "Title": "A", "SubTitle": "", "IcoPath": "i", "Score": 1 }] })
        );
    }

    #[tokio::test]
    async fn test_context_menu_request() {
        let request = Request::parse(
            r#"{"method":"context_menu","parameters":[{"original_data":null,"defined_menu_items":[{"Title":"X"}]}]}"#,
        )
        .unwrap();
        let host = RecordingHost::default();
        let response = handle(&forwarder(), &request, &host).await.unwrap();
        assert_eq!(response.result.len(), 1);
        assert_eq!(response.result[0].title, "X");
    }

    #[tokio::test]
    async fn test_callback_request_emits_only() {
        let request =
            Request::parse(r#"{"method":"copy_to_clipboard","parameters":["x","false","true"]}"#)
                .unwrap();
        let host = RecordingHost::default();
        assert!(handle(&forwarder(), &request, &host).await.is_none());
        assert_eq!(
            *host.emitted.borrow(),
            vec![HostInstruction::copy_to_clipboard("x", false, true)]
        );
    }

    #[tokio::test]
    async fn test_unknown_method_ignored() {
        let request = Request::parse(r#"{"method":"format_disk","parameters":[]}"#).unwrap();
        let host = RecordingHost::default();
        assert!(handle(&forwarder(), &request, &host).await.is_none());
        assert!(host.emitted.borrow().is_empty());
    }
}
