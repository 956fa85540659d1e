//! Graph loading.

use std::path::Path;

use crate::error::GraphError;
use crate::graph::Graph;
use crate::manifest::GraphManifest;

/// File name of the graph manifest inside a project root.
pub const GRAPH_MANIFEST_FILE: &str = "graph.json";

/// Error type returned by a [`Generator`]. Consumers treat it as opaque.
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

/// Loads the dependency graph for a project root.
pub trait Generator {
    /// Loads the graph rooted at `path`.
    fn load(&self, path: &Path) -> Result<Graph, LoadError>;
}

/// Reads `<path>/graph.json` and resolves it into a [`Graph`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestGenerator;

impl ManifestGenerator {
    /// Typed variant of [`Generator::load`].
    pub fn load_manifest(&self, path: &Path) -> Result<Graph, GraphError> {
        let manifest_path = path.join(GRAPH_MANIFEST_FILE);
        let content = std::fs::read_to_string(&manifest_path).map_err(|e| GraphError::Io {
            path: manifest_path.clone(),
            source: e,
        })?;
        GraphManifest::from_json(&content)?.into_graph(path)
    }
}

impl Generator for ManifestGenerator {
    fn load(&self, path: &Path) -> Result<Graph, LoadError> {
        Ok(self.load_manifest(path)?)
    }
}
