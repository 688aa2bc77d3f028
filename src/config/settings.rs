//! Application settings file.
//!
//! Settings only supply defaults; command-line flags always win. The file is
//! read, never written, and a missing file simply means built-in defaults.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of the default settings file (`~/.config/portsweep/settings.json`
/// on Linux), if a home directory can be determined.
pub fn default_settings_file() -> Option<PathBuf> {
    ProjectDirs::from("com", "portsweep", "portsweep")
        .map(|project| project.config_dir().join("settings.json"))
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default number of concurrent probes.
    pub default_concurrency: usize,
    /// Default per-probe timeout in seconds.
    pub default_timeout_secs: f64,
    /// How often the progress bar is redrawn, in milliseconds.
    pub progress_interval_ms: u64,
    /// Resolve service names for open ports.
    pub show_services: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_concurrency: 100,
            default_timeout_secs: 1.0,
            progress_interval_ms: 100,
            show_services: true,
        }
    }
}

impl AppSettings {
    /// Load settings from `path` when given, otherwise from the default
    /// location. Only an explicitly requested file is required to exist.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match default_settings_file() {
                Some(file) if file.exists() => Self::load_from(&file),
                _ => {
                    debug!("no settings file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }
}
