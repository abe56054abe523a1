//! Settings schema for the configuration service itself.
//!
//! These settings describe *where* properties come from and *how* they are
//! refreshed. They are distinct from the properties the service serves.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root settings for a [`ConfigurationService`](crate::ConfigurationService).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServiceSettings {
    /// Environment variable naming the home directory.
    pub home_env_var: String,

    /// Home directory used when neither an explicit path nor the variable is valid.
    pub default_home: String,

    /// Subdirectory of home holding all sources.
    pub config_dir: String,

    /// Primary source file name (required).
    pub primary_file: String,

    /// Local override file name (optional, applied after modules).
    pub local_file: String,

    /// Subdirectory of `config_dir` scanned for module files.
    pub modules_dir: String,

    /// Extension (without dot) identifying module files.
    pub module_extension: String,

    /// Separator used when a single string is read as an array.
    pub array_separator: char,

    pub reload: ReloadSettings,

    pub environment: EnvironmentSettings,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            home_env_var: "DSPACE_HOME".to_string(),
            default_home: "/dspace".to_string(),
            config_dir: "config".to_string(),
            primary_file: "dspace.cfg".to_string(),
            local_file: "local.cfg".to_string(),
            modules_dir: "modules".to_string(),
            module_extension: "cfg".to_string(),
            array_separator: ',',
            reload: ReloadSettings::default(),
            environment: EnvironmentSettings::default(),
        }
    }
}

/// How background reloads are triggered.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReloadTrigger {
    /// Compare modification times on every poll tick.
    #[default]
    Poll,
    /// Poll, and additionally resync as soon as a filesystem event arrives.
    Events,
}

/// Automatic reload settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReloadSettings {
    /// Start the background supervisor.
    pub enabled: bool,

    /// Poll interval in milliseconds.
    pub poll_interval_ms: u64,

    pub trigger: ReloadTrigger,
}

impl ReloadSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ReloadSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 2000,
            trigger: ReloadTrigger::Poll,
        }
    }
}

/// Environment overlay settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EnvironmentSettings {
    /// Import allowed variables into the merged configuration.
    pub enabled: bool,

    /// Exact names, or `PREFIX*` patterns. Empty admits nothing.
    pub allow: Vec<String>,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            allow: Vec::new(),
        }
    }
}
