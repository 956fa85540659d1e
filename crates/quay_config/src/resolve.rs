//! Cache profile resolution.

use crate::error::ConfigError;
use crate::types::{CacheProfile, ProjectConfig};

/// Looks up the profile named `name`.
///
/// An absent name is an error; there is no fallback profile.
pub fn resolve_profile<'a>(
    config: &'a ProjectConfig,
    name: &str,
) -> Result<&'a CacheProfile, ConfigError> {
    config
        .cache
        .profiles
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
}

/// The build configuration to hash with: the profile's when one is selected,
/// otherwise `cache.default_configuration`.
pub fn resolve_configuration<'a>(
    config: &'a ProjectConfig,
    profile: Option<&'a CacheProfile>,
) -> &'a str {
    profile
        .map(|p| p.configuration.as_str())
        .unwrap_or(config.cache.default_configuration.as_str())
}
