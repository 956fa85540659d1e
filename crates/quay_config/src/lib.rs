//! Parsing and validation of `quay.toml` project configuration files.
//!
//! This crate is the cache profile registry: it reads the named cache
//! profiles a project declares and resolves them by name.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, ConfigLoader, FsConfigLoader, CONFIG_FILE};
pub use resolve::{resolve_configuration, resolve_profile};
pub use types::*;
