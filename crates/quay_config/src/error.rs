//! Configuration errors.

/// Failure to load a `quay.toml` or to resolve something named in it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `quay.toml` exists but could not be read.
    #[error("cannot read quay.toml: {0}")]
    IoError(#[from] std::io::Error),

    /// `quay.toml` is not valid TOML for the expected schema.
    #[error("malformed quay.toml: {0}")]
    ParseError(String),

    /// A required value is absent or blank; holds the dotted key path.
    #[error("quay.toml: `{0}` must be set")]
    MissingField(String),

    /// Values are individually well-formed but inconsistent.
    #[error("quay.toml: {0}")]
    ValidationError(String),

    /// No cache profile has this name.
    #[error("unknown cache profile '{0}'")]
    UnknownProfile(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_key() {
        let missing = ConfigError::MissingField("cache.profiles[0].name".to_string());
        assert_eq!(missing.to_string(), "quay.toml: `cache.profiles[0].name` must be set");

        let profile = ConfigError::UnknownProfile("Device".to_string());
        assert_eq!(profile.to_string(), "unknown cache profile 'Device'");
    }

    #[test]
    fn io_errors_convert() {
        let err: ConfigError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, ConfigError::IoError(_)));
        assert!(err.to_string().starts_with("cannot read quay.toml"));
    }
}
