//! Errors raised while building or loading a dependency graph.

use std::path::PathBuf;

/// Errors that can occur when constructing a [`Graph`](crate::Graph).
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The graph manifest could not be read.
    #[error("failed to read graph manifest {path}: {source}")]
    Io {
        /// The manifest path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The graph manifest is not valid JSON for the expected schema.
    #[error("failed to parse graph manifest: {reason}")]
    ManifestParse {
        /// Description of the parse failure.
        reason: String,
    },

    /// Two projects share the same path.
    #[error("project at {path} is declared more than once")]
    DuplicateProject {
        /// The repeated project path.
        path: PathBuf,
    },

    /// Two targets in one project share the same name.
    #[error("target '{name}' is declared more than once in project {project}")]
    DuplicateTarget {
        /// The owning project path.
        project: PathBuf,
        /// The repeated target name.
        name: String,
    },

    /// A dependency reference does not resolve to any target in the graph.
    #[error("target '{target}' in project {project} depends on unknown target '{dependency}'")]
    UnknownDependency {
        /// The dependent target.
        target: String,
        /// The project of the dependent target.
        project: PathBuf,
        /// The unresolved reference, as written.
        dependency: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_target_display() {
        let err = GraphError::DuplicateTarget {
            project: PathBuf::from("/ws/App"),
            name: "Core".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "target 'Core' is declared more than once in project /ws/App"
        );
    }

    #[test]
    fn unknown_dependency_names_both_ends() {
        let err = GraphError::UnknownDependency {
            target: "App".to_string(),
            project: PathBuf::from("/ws/App"),
            dependency: "../Lib:Net".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'App'"));
        assert!(msg.contains("'../Lib:Net'"));
    }

    #[test]
    fn io_error_display() {
        let err = GraphError::Io {
            path: PathBuf::from("/ws/graph.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        assert!(err.to_string().starts_with("failed to read graph manifest /ws/graph.json"));
    }
}
