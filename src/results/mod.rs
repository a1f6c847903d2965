//! Result entries returned to the launcher host
//!
//! Handles mapping of upstream items, context payloads and icon resolution.

mod icons;
mod mapper;
mod types;

pub use icons::{IconResolver, DEFAULT_ICON};
pub use mapper::ResultMapper;
pub use types::*;
