//! HTTP Query Forwarder: a launcher plugin backed by a local HTTP server
//!
//! Each query typed into the launcher is forwarded to a configurable HTTP
//! endpoint. The JSON array it answers with is rendered as result entries,
//! which may carry context menus and callbacks back into the launcher.

pub mod actions;
pub mod config;
pub mod error;
pub mod forwarder;
pub mod network;
pub mod query;
pub mod results;
pub mod rpc;

pub use config::Settings;
pub use error::ForwardError;
pub use forwarder::QueryForwarder;
pub use results::ResultEntry;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
