//! Icon path resolution

use std::path::{Path, PathBuf};

/// Plugin icon, relative to the plugin directory
pub const DEFAULT_ICON: &str = "Images/icon.png";

/// Resolves icon references against the plugin directory
#[derive(Debug, Clone)]
pub struct IconResolver {
    plugin_dir: PathBuf,
    default_icon: String,
}

impl IconResolver {
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        let plugin_dir = plugin_dir.into();
        let default_icon = plugin_dir.join(DEFAULT_ICON).to_string_lossy().into_owned();
        Self {
            plugin_dir,
            default_icon,
        }
    }

    /// The plugin's own icon
    pub fn default_icon(&self) -> &str {
        &self.default_icon
    }

    /// Resolve a server-supplied icon, falling back to the plugin icon.
    ///
    /// Accepted: absolute http(s) URLs and paths to existing files, either
    /// absolute or relative to the plugin directory.
    pub fn resolve(&self, icon: Option<&str>) -> String {
        let icon = match icon.map(str::trim).filter(|s| !s.is_empty()) {
            Some(icon) => icon,
            None => return self.default_icon.clone(),
        };

        let lower = icon.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return icon.to_string();
        }

        let path = Path::new(icon);
        let candidate = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.plugin_dir.join(path)
        };
        if candidate.is_file() {
            candidate.to_string_lossy().into_owned()
        } else {
            self.default_icon.clone()
        }
    }
}
