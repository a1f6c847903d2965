//! Callback actions for selected entries
//!
//! Entries and menu items may name one of a small, fixed set of callbacks.
//! The host invokes them later, one at a time, with positional parameters:
//! - open_url: open a URL in the default browser
//! - shell_run: ask the host to run a shell command
//! - copy_to_clipboard: ask the host to copy text
//! - change_query: replace the host's query, optionally re-running it
//! - flow_show_msg: ask the host to show a message

mod host;
mod registry;

pub use host::{methods, open_in_browser, Host, HostInstruction, StdoutHost};
pub use registry::ActionRegistry;

#[cfg(test)]
pub(crate) use host::testing;

use crate::results::IconResolver;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while running a callback; always logged, never surfaced
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action '{action}' is missing parameter '{name}'")]
    MissingParameter {
        action: &'static str,
        name: &'static str,
    },

    #[error("cannot register action '{0}': name is empty or already taken")]
    InvalidRegistration(String),

    #[error("host call failed: {0}")]
    Host(#[from] std::io::Error),
}

/// The closed set of callbacks the plugin understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    OpenUrl,
    ShellRun,
    CopyToClipboard,
    ChangeQuery,
    ShowMessage,
}

impl Callback {
    pub const ALL: [Callback; 5] = [
        Callback::OpenUrl,
        Callback::ShellRun,
        Callback::CopyToClipboard,
        Callback::ChangeQuery,
        Callback::ShowMessage,
    ];

    /// Method name used in callback descriptors
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenUrl => "open_url",
            Self::ShellRun => "shell_run",
            Self::CopyToClipboard => "copy_to_clipboard",
            Self::ChangeQuery => "change_query",
            Self::ShowMessage => "flow_show_msg",
        }
    }

    /// Run the callback against the host
    pub fn run(
        &self,
        params: &[Value],
        host: &dyn Host,
        icons: &IconResolver,
    ) -> Result<(), ActionError> {
        let action = self.name();
        let required = |index: usize, name: &'static str| {
            text_param(params, index).ok_or(ActionError::MissingParameter { action, name })
        };

        match self {
            Self::OpenUrl => {
                let url = required(0, "url")?;
                host.open_url(&url)?;
            }
            Self::ShellRun => {
                let command = match params.first() {
                    Some(Value::Array(parts)) => parts.first().and_then(value_text),
                    Some(other) => value_text(other),
                    None => None,
                }
                .ok_or(ActionError::MissingParameter {
                    action,
                    name: "command",
                })?;
                host.emit(&HostInstruction::shell_run(&command))?;
            }
            Self::CopyToClipboard => {
                let text = required(0, "text")?;
                let direct_copy = flag_param(params, 1, false);
                let show_notification = flag_param(params, 2, true);
                host.emit(&HostInstruction::copy_to_clipboard(
                    &text,
                    direct_copy,
                    show_notification,
                ))?;
            }
            Self::ChangeQuery => {
                let query = required(0, "new_query")?;
                let requery = flag_param(params, 1, false);
                host.change_query(&query, requery)?;
            }
            Self::ShowMessage => {
                let title = required(0, "title")?;
                let subtitle = text_param(params, 1).unwrap_or_default();
                let icon = icons.resolve(text_param(params, 2).as_deref());
                host.emit(&HostInstruction::show_msg(&title, &subtitle, &icon))?;
            }
        }
        Ok(())
    }
}

/// Render a parameter as text; strings verbatim, other values as JSON
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text_param(params: &[Value], index: usize) -> Option<String> {
    params.get(index).and_then(value_text)
}

/// Read a flag given as a JSON bool or the strings "true"/"false"
fn flag_param(params: &[Value], index: usize, default: bool) -> bool {
    match params.get(index) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => default,
        },
        _ => default,
    }
}
