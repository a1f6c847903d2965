//! Action registry mapping callback names to actions

use super::{ActionError, Callback, Host};
use crate::results::IconResolver;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Registry of callbacks that entries are allowed to name
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Callback>,
}

impl ActionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with every built-in callback
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for callback in Callback::ALL {
            if let Err(e) = registry.register(callback.name(), callback) {
                warn!("{}", e);
            }
        }
        registry
    }

    /// Register a callback under `name`; empty and duplicate names are rejected
    pub fn register(&mut self, name: &str, callback: Callback) -> Result<(), ActionError> {
        let name = name.trim();
        if name.is_empty() || self.actions.contains_key(name) {
            return Err(ActionError::InvalidRegistration(name.to_string()));
        }
        self.actions.insert(name.to_string(), callback);
        Ok(())
    }

    /// Check if a callback name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Get a callback by name
    pub fn get(&self, name: &str) -> Option<Callback> {
        self.actions.get(name).copied()
    }

    /// Get all registered names
    pub fn names(&self) -> Vec<&str> {
        self.actions.keys().map(|s| s.as_str()).collect()
    }

    /// Run the named callback. Failures are logged, never returned.
    pub fn dispatch(&self, name: &str, params: &[Value], host: &dyn Host, icons: &IconResolver) {
        let callback = match self.get(name) {
            Some(callback) => callback,
            None => {
                warn!("Ignoring unknown callback '{}'", name);
                return;
            }
        };

        debug!("Running callback '{}' with {} parameters", name, params.len());
        if let Err(e) = callback.run(params, host, icons) {
            error!("Callback '{}' failed: {}", name, e);
        }
    }
}
