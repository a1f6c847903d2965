//! Query forwarding and result orchestration

use crate::actions::{ActionRegistry, Host};
use crate::config::Settings;
use crate::error::ForwardError;
use crate::network::HttpClient;
use crate::query::build_url;
use crate::results::{ContextPayload, IconResolver, ResultEntry, ResultMapper};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Title of the idle entry shown for an empty query
pub const PLUGIN_TITLE: &str = "HTTP Query Forwarder";

/// Handles the host's entry points for one invocation
pub struct QueryForwarder {
    /// Effective settings
    settings: Settings,
    /// HTTP client for the upstream request
    client: HttpClient,
    /// Icon resolution against the plugin directory
    icons: IconResolver,
    /// Callbacks entries may name
    actions: ActionRegistry,
}

impl QueryForwarder {
    /// Create a new forwarder
    pub fn new(settings: Settings, client: HttpClient, icons: IconResolver) -> Self {
        Self {
            settings,
            client,
            icons,
            actions: ActionRegistry::with_defaults(),
        }
    }

    /// Replace the callback registry
    pub fn with_actions(mut self, actions: ActionRegistry) -> Self {
        self.actions = actions;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Forward `query` upstream and map the answer. Never fails: every
    /// problem becomes a single entry.
    pub async fn query(&self, query: &str) -> Vec<ResultEntry> {
        let start = Instant::now();

        let results = match self.fetch(query).await {
            Ok(results) => results,
            Err(e) => {
                match &e {
                    ForwardError::Unexpected(detail) => {
                        error!("Query '{}' failed unexpectedly: {}", query, detail)
                    }
                    other => warn!("Query '{}' failed: {}", query, other),
                }
                return vec![e.into_entry(self.icons.default_icon())];
            }
        };

        debug!(
            "Query '{}' produced {} results in {:?}",
            query,
            results.len(),
            start.elapsed()
        );

        if !results.is_empty() {
            return results;
        }

        if query.is_empty() {
            vec![ResultEntry::new(PLUGIN_TITLE, self.icons.default_icon()).with_subtitle(
                format!("Ready. Server: {}", self.settings.describe_target()),
            )]
        } else {
            vec![ResultEntry::new("No results", self.icons.default_icon())
                .with_subtitle(format!("No results for '{}'", query))]
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<ResultEntry>, ForwardError> {
        let url = build_url(query, &self.settings)?;
        info!("Forwarding query to {}", url);

        let timeout = Duration::from_secs(self.settings.request_timeout);
        let items = self.client.get_json_array(&url, timeout).await?;

        Ok(self.mapper().map_results(&items))
    }

    /// Expand the context menu of a previously returned entry
    pub fn context_menu(&self, payload: &Value) -> Vec<ResultEntry> {
        let wrapped = ContextPayload::from_value(payload);

        let entries = wrapped
            .as_ref()
            .map(|p| self.mapper().map_menu_items(&p.defined_menu_items))
            .unwrap_or_default();
        if !entries.is_empty() {
            return entries;
        }

        let has_data = match &wrapped {
            Some(p) => p.original_data.is_some(),
            None => !payload.is_null(),
        };
        let subtitle = if has_data {
            "This result has no server-defined actions"
        } else {
            "This result carries no context data"
        };
        vec![ResultEntry::new("No context actions available", self.icons.default_icon())
            .with_subtitle(subtitle)]
    }

    /// Run a named callback; unknown names and failures are only logged
    pub fn invoke(&self, method: &str, params: &[Value], host: &dyn Host) {
        self.actions.dispatch(method, params, host, &self.icons);
    }

    fn mapper(&self) -> ResultMapper<'_> {
        ResultMapper::new(&self.icons, &self.actions)
    }
}
