//! Configuration module for the query forwarder
//!
//! Settings come from the first provider that has any: the host (settings
//! injected into the request), then a settings file next to the plugin, then
//! built-in defaults. Environment variables are applied last.

mod settings;

pub use settings::*;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the directory used under the user config dir
const APP_DIR_NAME: &str = "http-query-forwarder";

/// Directory the plugin is installed in, computed once per process
static PLUGIN_DIR: Lazy<PathBuf> = Lazy::new(|| {
    if let Ok(dir) = std::env::var("HQF_PLUGIN_DIR") {
        return PathBuf::from(dir);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
});

/// Get the plugin installation directory
pub fn plugin_dir() -> &'static Path {
    &PLUGIN_DIR
}

/// A source of raw settings
pub trait SettingsProvider {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Raw key/value settings, or `None` when this source has nothing
    fn raw(&self) -> Option<Map<String, Value>>;
}

/// Settings injected by the host alongside the request
pub struct HostSettings {
    raw: Option<Map<String, Value>>,
}

impl HostSettings {
    /// Wrap the request's settings value; only objects count
    pub fn new(value: Option<&Value>) -> Self {
        Self {
            raw: value.and_then(Value::as_object).cloned(),
        }
    }
}

impl SettingsProvider for HostSettings {
    fn name(&self) -> &str {
        "host"
    }

    fn raw(&self) -> Option<Map<String, Value>> {
        self.raw.clone()
    }
}

/// Settings kept in a flat JSON or YAML file
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate the settings file, creating one with defaults when none exists
    pub fn locate() -> Self {
        let env_path = std::env::var("HQF_SETTINGS_PATH").ok().map(PathBuf::from);
        Self::locate_in(env_path, plugin_dir(), dirs::config_dir())
    }

    /// Locate from explicit lookup roots; the first candidate is created if none exist
    pub fn locate_in(
        env_path: Option<PathBuf>,
        plugin_dir: &Path,
        config_dir: Option<PathBuf>,
    ) -> Self {
        let candidates = settings_candidates(env_path.as_deref(), plugin_dir, config_dir);

        if let Some(existing) = candidates.iter().find(|p| p.exists()) {
            debug!("Using settings file: {}", existing.display());
            return Self::new(existing.clone());
        }

        let primary = env_path.unwrap_or_else(|| plugin_dir.join("settings.json"));
        match write_defaults(&primary) {
            Ok(()) => info!("Created default settings file: {}", primary.display()),
            Err(e) => warn!("Could not create settings file {}: {:#}", primary.display(), e),
        }
        Self::new(primary)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsProvider for FileSettings {
    fn name(&self) -> &str {
        "file"
    }

    fn raw(&self) -> Option<Map<String, Value>> {
        match read_settings_file(&self.path) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                warn!(
                    "Settings file {} is not a mapping, using defaults",
                    self.path.display()
                );
                None
            }
            Err(e) => {
                warn!("Ignoring settings file {}: {:#}", self.path.display(), e);
                None
            }
        }
    }
}

/// Resolve settings from the first provider that yields a mapping
pub fn resolve(providers: &[&dyn SettingsProvider]) -> Settings {
    let mut settings = providers
        .iter()
        .find_map(|provider| {
            provider.raw().map(|raw| {
                debug!("Loaded settings from {} provider", provider.name());
                Settings::from_map(&raw)
            })
        })
        .unwrap_or_else(|| {
            debug!("No settings provider available, using defaults");
            Settings::default()
        });
    settings.merge_env();
    settings
}

/// Candidate settings file paths, in lookup order
fn settings_candidates(
    env_path: Option<&Path>,
    plugin_dir: &Path,
    config_dir: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = env_path {
        paths.push(path.to_path_buf());
    }
    for name in ["settings.json", "settings.yaml", "settings.yml"] {
        paths.push(plugin_dir.join(name));
    }
    if let Some(dir) = config_dir {
        paths.push(dir.join(APP_DIR_NAME).join("settings.json"));
    }
    paths
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Read a settings file as JSON or YAML depending on its extension
pub fn read_settings_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = if is_yaml(path) {
        serde_yaml::from_str(&content).context("invalid YAML")?
    } else {
        serde_json::from_str(&content).context("invalid JSON")?
    };
    Ok(value)
}

/// Write the default settings document to `path`
pub fn write_defaults(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let document = Settings::default_document();
    let content = if is_yaml(path) {
        serde_yaml::to_string(&document)?
    } else {
        serde_json::to_string_pretty(&document)?
    };
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
