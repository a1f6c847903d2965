//! HTTP networking module
//!
//! Provides the client used for the single upstream request per query.

mod client;

pub use client::{parse_array, HttpClient};
