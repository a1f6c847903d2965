//! Query forwarding module
//!
//! Turns one host invocation into at most one upstream request and a
//! result list, mapping every failure to a single entry.

mod handler;

pub use handler::{QueryForwarder, PLUGIN_TITLE};
