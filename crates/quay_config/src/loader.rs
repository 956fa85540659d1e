//! Configuration file loading and validation.

use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::ProjectConfig;

/// File name of the configuration inside a project root.
pub const CONFIG_FILE: &str = "quay.toml";

/// Supplies the configuration for a project root.
pub trait ConfigLoader {
    /// Loads the configuration for the project at `path`.
    fn load_config(&self, path: &Path) -> Result<ProjectConfig, ConfigError>;
}

/// Reads `quay.toml` from the project directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsConfigLoader;

impl ConfigLoader for FsConfigLoader {
    fn load_config(&self, path: &Path) -> Result<ProjectConfig, ConfigError> {
        load_config(path)
    }
}

/// Loads and validates `<project_dir>/quay.toml`.
///
/// A project without a configuration file gets [`ProjectConfig::default`].
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    match std::fs::read_to_string(&config_path) {
        Ok(content) => load_config_from_str(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "no configuration file, using defaults");
            Ok(ProjectConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Parses and validates a `quay.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.cache.default_configuration.trim().is_empty() {
        return Err(ConfigError::MissingField(
            "cache.default_configuration".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for (i, profile) in config.cache.profiles.iter().enumerate() {
        if profile.name.trim().is_empty() {
            return Err(ConfigError::MissingField(format!("cache.profiles[{i}].name")));
        }
        if profile.configuration.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "cache.profiles[{i}].configuration"
            )));
        }
        if !seen.insert(profile.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "cache profile '{}' is declared more than once",
                profile.name
            )));
        }
    }
    Ok(())
}
