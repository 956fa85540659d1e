//! Error types for content hashing and the print-hashes service.

use std::path::PathBuf;

use quay_config::ConfigError;
use quay_graph::LoadError;

/// Errors raised while hashing a graph.
///
/// Every variant is fatal for the hashing pass: no partial mapping is
/// returned, since a skipped target would leave its dependents with wrong keys.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A source, resource, or header file referenced by a target could not be read.
    #[error("cannot read {path} for target '{target}': {source}")]
    UnreadableSource {
        /// The target referencing the file.
        target: String,
        /// The resolved file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A build setting has no canonical serialization.
    #[error("invalid build setting '{key}' on target '{target}': {reason}")]
    InvalidSetting {
        /// The target declaring the setting.
        target: String,
        /// The setting key.
        key: String,
        /// What makes the setting non-representable.
        reason: String,
    },

    /// The requested targets contain a dependency cycle.
    #[error(
        "cyclic dependency at target '{target}' ({}): {}",
        project.display(),
        cycle.join(" -> ")
    )]
    CyclicDependency {
        /// A target on the cycle.
        target: String,
        /// The project owning `target`.
        project: PathBuf,
        /// Target names along the cycle, starting and ending at `target`.
        cycle: Vec<String>,
    },

    /// A requested root target does not exist in the graph.
    #[error("unknown target '{name}'")]
    UnknownTarget {
        /// The requested name.
        name: String,
    },

    /// A dependency had no final hash when its dependent was composed.
    #[error("internal error: target '{target}' was scheduled before its dependency '{dependency}'")]
    MissingDependencyHash {
        /// The dependent target.
        target: String,
        /// The dependency without a hash.
        dependency: String,
    },

    /// The pass was cancelled before completing.
    #[error("hashing cancelled")]
    Cancelled,

    /// The worker pool could not be created.
    #[error("failed to start hashing workers: {reason}")]
    ThreadPool {
        /// Description of the failure.
        reason: String,
    },
}

/// Errors returned by [`CachePrintHashesService`](crate::CachePrintHashesService).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The requested profile is not declared in the project configuration.
    #[error("cache profile '{name}' not found; available profiles: {}", list_or_none(.available))]
    ProfileNotFound {
        /// The requested profile name.
        name: String,
        /// Names of the declared profiles.
        available: Vec<String>,
    },

    /// The project configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The graph could not be loaded; the generator's error, unchanged.
    #[error(transparent)]
    GraphLoad(LoadError),

    /// Hashing failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
