//! Result type definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single entry in the host's result list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    /// Display title, never empty
    #[serde(rename = "Title")]
    pub title: String,
    /// Second line of text
    #[serde(rename = "SubTitle")]
    pub subtitle: String,
    /// Icon path or URL
    #[serde(rename = "IcoPath")]
    pub icon: String,
    /// Relevance score; context-menu entries carry none
    #[serde(rename = "Score", skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    /// Text placed in the query box on autocomplete
    #[serde(rename = "AutoCompleteText", skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    /// Opaque payload handed back on context-menu requests
    #[serde(rename = "ContextData", skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// Action run when the entry is selected
    #[serde(rename = "JsonRPCAction", skip_serializing_if = "Option::is_none")]
    pub action: Option<JsonRpcAction>,
}

impl ResultEntry {
    /// Create an entry with just a title and icon
    pub fn new(title: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            icon: icon.into(),
            score: None,
            autocomplete: None,
            context: None,
            action: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_autocomplete(mut self, text: impl Into<String>) -> Self {
        self.autocomplete = Some(text.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_action(mut self, action: JsonRpcAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// A named callback with positional parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcAction {
    pub method: String,
    pub parameters: Vec<Value>,
}

impl JsonRpcAction {
    pub fn new(method: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            parameters,
        }
    }
}

/// Context data wrapping server-defined menu items with the original payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPayload {
    /// Payload the server attached to the entry, if any
    #[serde(default)]
    pub original_data: Option<Value>,
    /// Raw menu item definitions from the server
    #[serde(default)]
    pub defined_menu_items: Vec<Value>,
}

impl ContextPayload {
    /// Read a payload back from context data; plain server payloads yield `None`
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.as_object()?.contains_key("defined_menu_items") {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_wire_format() {
        let entry = ResultEntry::new("A", "icon.png")
            .with_subtitle("sub")
            .with_score(3)
            .with_action(JsonRpcAction::new("open_url", vec![json!("http://x")]));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({
                "Title": "A",
                "SubTitle": "sub",
                "IcoPath": "icon.png",
                "Score": 3,
                "JsonRPCAction": { "method": "open_url", "parameters": ["http://x"] }
            })
        );
    }

    #[test]
    fn test_menu_entry_has_no_score() {
        let value = serde_json::to_value(ResultEntry::new("A", "i")).unwrap();
        assert!(value.get("Score").is_none());
        assert!(value.get("ContextData").is_none());
    }

    #[test]
    fn test_context_payload_wire_format() {
        let payload = ContextPayload {
            original_data: None,
            defined_menu_items: vec![json!({ "Title": "X" })],
        };
        let value = payload.to_value().unwrap();
        assert_eq!(
            value,
            json!({ "original_data": null, "defined_menu_items": [{ "Title": "X" }] })
        );
        assert_eq!(ContextPayload::from_value(&value), Some(payload));
    }

    #[test]
    fn test_context_payload_from_value() {
        let payload = ContextPayload::from_value(&json!({
            "original_data": null,
            "defined_menu_items": [{ "Title": "X" }]
        }))
        .unwrap();
        assert!(payload.original_data.is_none());
        assert_eq!(payload.defined_menu_items.len(), 1);

        assert!(ContextPayload::from_value(&json!({ "id": 4 })).is_none());
        assert!(ContextPayload::from_value(&json!({ "defined_menu_items": 3 })).is_none());
        assert!(ContextPayload::from_value(&json!("plain")).is_none());
    }
}
