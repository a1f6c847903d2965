//! Side-effect protocol towards the launcher host
//!
//! Most actions are not performed by the plugin itself: they are written to
//! stdout as one JSON instruction per line and executed by the host. Opening
//! a URL is the exception and happens directly.

use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, Write};
use tracing::debug;

/// Host method names understood by the launcher
pub mod methods {
    pub const SHELL_RUN: &str = "Flow.Launcher.ShellRun";
    pub const COPY_TO_CLIPBOARD: &str = "Flow.Launcher.CopyToClipboard";
    pub const CHANGE_QUERY: &str = "Flow.Launcher.ChangeQuery";
    pub const SHOW_MSG: &str = "Flow.Launcher.ShowMsg";
}

/// One instruction for the host to carry out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostInstruction {
    pub method: String,
    pub parameters: Vec<Value>,
}

impl HostInstruction {
    pub fn shell_run(command: &str) -> Self {
        Self::new(methods::SHELL_RUN, vec![json!(command)])
    }

    pub fn copy_to_clipboard(text: &str, direct_copy: bool, show_notification: bool) -> Self {
        Self::new(
            methods::COPY_TO_CLIPBOARD,
            vec![json!(text), json!(direct_copy), json!(show_notification)],
        )
    }

    pub fn change_query(query: &str, requery: bool) -> Self {
        Self::new(methods::CHANGE_QUERY, vec![json!(query), json!(requery)])
    }

    pub fn show_msg(title: &str, subtitle: &str, icon: &str) -> Self {
        Self::new(
            methods::SHOW_MSG,
            vec![json!(title), json!(subtitle), json!(icon)],
        )
    }

    fn new(method: &str, parameters: Vec<Value>) -> Self {
        Self {
            method: method.to_string(),
            parameters,
        }
    }
}

/// Capabilities the plugin needs from its host
pub trait Host {
    /// Hand an instruction to the host
    fn emit(&self, instruction: &HostInstruction) -> io::Result<()>;

    /// Open a URL in the default browser
    fn open_url(&self, url: &str) -> io::Result<()>;

    /// Replace the host's query text, optionally re-running it
    fn change_query(&self, query: &str, requery: bool) -> io::Result<()> {
        self.emit(&HostInstruction::change_query(query, requery))
    }
}

/// Host reached through stdout, the normal plugin process setup
#[derive(Debug, Default)]
pub struct StdoutHost;

impl Host for StdoutHost {
    fn emit(&self, instruction: &HostInstruction) -> io::Result<()> {
        let line = serde_json::to_string(instruction)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", line)?;
        stdout.flush()
    }

    fn open_url(&self, url: &str) -> io::Result<()> {
        open_in_browser(url)
    }
}

/// Open `url` with the platform's default handler without waiting for it
pub fn open_in_browser(url: &str) -> io::Result<()> {
    if url.trim().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty url"));
    }

    debug!("Opening in browser: {}", url);
    open::that_detached(url)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_wire_format() {
        let line = serde_json::to_string(&HostInstruction::copy_to_clipboard("hi", false, true))
            .unwrap();
        assert_eq!(
            line,
            r#"{"method":"Flow.Launcher.CopyToClipboard","parameters":["hi",false,true]}"#
        );
    }

    #[test]
    fn test_change_query_defaults_to_emit() {
        let host = testing::RecordingHost::default();
        host.change_query("new", true).unwrap();
        assert_eq!(
            host.emitted.borrow()[0],
            HostInstruction::change_query("new", true)
        );
    }

    #[test]
    fn test_open_empty_url_rejected() {
        assert!(open_in_browser("  ").is_err());
    }
}
