//! Configuration types deserialized from `quay.toml`.

use serde::{Deserialize, Serialize};

/// Build configuration used when no cache profile is selected.
pub const DEFAULT_CONFIGURATION: &str = "Debug";

/// The top-level project configuration parsed from `quay.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata.
    #[serde(default)]
    pub project: ProjectMeta,
    /// Cache settings, including the named profiles.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Optional project metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectMeta {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// The `[cache]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Configuration hashed when no profile is selected.
    #[serde(default = "default_configuration")]
    pub default_configuration: String,
    /// Named profiles, selectable with `--profile`.
    #[serde(default)]
    pub profiles: Vec<CacheProfile>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_configuration: default_configuration(),
            profiles: Vec::new(),
        }
    }
}

fn default_configuration() -> String {
    DEFAULT_CONFIGURATION.to_string()
}

/// A named bundle of build configuration, device, and OS version.
///
/// Only `configuration`, `device`, and `os` affect cache keys; `name` is the
/// lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheProfile {
    /// Profile name.
    pub name: String,
    /// Build configuration (e.g. `"Debug"`).
    pub configuration: String,
    /// Simulator or device descriptor (e.g. `"iPhone 12"`).
    #[serde(default)]
    pub device: Option<String>,
    /// OS version (e.g. `"15.0.0"`).
    #[serde(default)]
    pub os: Option<String>,
}

impl CacheProfile {
    /// Creates a profile with no device or OS.
    pub fn new(name: impl Into<String>, configuration: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configuration: configuration.into(),
            device: None,
            os: None,
        }
    }

    /// Sets the device descriptor.
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Sets the OS version.
    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self
    }
}
