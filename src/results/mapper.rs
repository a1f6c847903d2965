//! Mapping of upstream JSON items into result entries

use super::icons::IconResolver;
use super::types::{ContextPayload, JsonRpcAction, ResultEntry};
use crate::actions::ActionRegistry;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Maps raw server items into entries the host can render
pub struct ResultMapper<'a> {
    icons: &'a IconResolver,
    actions: &'a ActionRegistry,
}

impl<'a> ResultMapper<'a> {
    pub fn new(icons: &'a IconResolver, actions: &'a ActionRegistry) -> Self {
        Self { icons, actions }
    }

    /// Map every usable item of a response array, keeping source order
    pub fn map_results(&self, items: &[Value]) -> Vec<ResultEntry> {
        let entries: Vec<ResultEntry> = items
            .iter()
            .filter_map(|item| self.map_result(item))
            .collect();
        debug!("Mapped {} of {} server items", entries.len(), items.len());
        entries
    }

    /// Map one response item; `None` when it has no usable title
    pub fn map_result(&self, item: &Value) -> Option<ResultEntry> {
        let object = item.as_object()?;
        let mut entry = self.base_entry(object)?.with_score(score(object.get("Score")));

        if let Some(text) = non_empty_str(object.get("AutoCompleteText")) {
            entry = entry.with_autocomplete(text);
        }

        let original = object.get("ContextData").filter(|v| is_truthy(v)).cloned();
        let menu_items = object
            .get("ContextMenuItems")
            .and_then(Value::as_array)
            .filter(|items| !items.is_empty());

        let context = match menu_items {
            Some(items) => {
                let payload = ContextPayload {
                    original_data: original.clone(),
                    defined_menu_items: items.clone(),
                };
                match payload.to_value() {
                    Ok(wrapped) => Some(wrapped),
                    Err(e) => {
                        warn!("Could not wrap context menu items: {}", e);
                        original
                    }
                }
            }
            None => original,
        };
        if let Some(context) = context {
            entry = entry.with_context(context);
        }

        Some(entry)
    }

    /// Map server-defined context menu items; entries carry no score
    pub fn map_menu_items(&self, items: &[Value]) -> Vec<ResultEntry> {
        items
            .iter()
            .filter_map(|item| item.as_object().and_then(|o| self.base_entry(o)))
            .collect()
    }

    /// Title, subtitle, icon and callback shared by results and menu items
    fn base_entry(&self, object: &Map<String, Value>) -> Option<ResultEntry> {
        let title = title(object.get("Title"))?;
        let icon = self.icons.resolve(object.get("IcoPath").and_then(Value::as_str));
        let subtitle = subtitle(object.get("SubTitle"));

        let mut entry = ResultEntry::new(title, icon).with_subtitle(subtitle);
        if let Some(action) = object.get("JsonRPCAction").and_then(|a| self.action(a)) {
            entry = entry.with_action(action);
        }
        Some(entry)
    }

    /// Keep a callback descriptor only when it names a registered action
    fn action(&self, descriptor: &Value) -> Option<JsonRpcAction> {
        let object = descriptor.as_object()?;
        let method = non_empty_str(object.get("method"))?;

        if !self.actions.contains(method) {
            warn!("Dropping callback with unknown method '{}'", method);
            return None;
        }

        let parameters = match object.get("parameters") {
            Some(Value::Array(params)) => params.clone(),
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                debug!("Callback '{}' parameters are not a list: {}", method, other);
                Vec::new()
            }
        };
        Some(JsonRpcAction::new(method, parameters))
    }
}

fn title(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Subtitle text; numbers and booleans are rendered, anything else is blank
fn subtitle(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Coerce a score to an integer, defaulting to 0
fn score(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

/// Empty strings, empty containers, zero, false and null carry no payload
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
