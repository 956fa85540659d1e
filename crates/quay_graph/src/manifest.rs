//! The serialized graph description read by [`ManifestGenerator`](crate::ManifestGenerator).
//!
//! Projects are listed with their targets. Dependencies are written by name,
//! optionally qualified with the path of another project relative to the
//! dependent's project. Resolution into [`TargetId`](crate::TargetId) edges
//! happens in [`GraphManifest::into_graph`].

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::{Graph, GraphBuilder};
use crate::target::Target;

/// Top-level manifest (`graph.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphManifest {
    /// Workspace name.
    pub name: String,
    /// Projects in the workspace.
    #[serde(default)]
    pub projects: Vec<ProjectManifest>,
}

/// One project entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Project name.
    pub name: String,
    /// Project directory, relative to the manifest's directory.
    pub path: PathBuf,
    /// Targets declared by the project.
    #[serde(default)]
    pub targets: Vec<TargetManifest>,
}

/// One target entry: its content plus named dependency references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetManifest {
    /// Target content.
    #[serde(flatten)]
    pub target: Target,
    /// Dependency references.
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
}

/// A reference to another target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRef {
    /// Path of the owning project relative to the dependent's project.
    /// `None` means the dependent's own project.
    #[serde(default)]
    pub project: Option<PathBuf>,
    /// Target name.
    pub target: String,
}

impl DependencyRef {
    fn describe(&self) -> String {
        match &self.project {
            Some(p) => format!("{}:{}", p.display(), self.target),
            None => self.target.clone(),
        }
    }
}

impl GraphManifest {
    /// Parses a manifest from JSON text.
    pub fn from_json(content: &str) -> Result<Self, GraphError> {
        serde_json::from_str(content).map_err(|e| GraphError::ManifestParse {
            reason: e.to_string(),
        })
    }

    /// Resolves the manifest into a [`Graph`] rooted at `root`.
    ///
    /// Project paths are joined onto `root` and normalized lexically, so
    /// `App/../Lib` and `Lib` name the same project.
    pub fn into_graph(self, root: &Path) -> Result<Graph, GraphError> {
        let mut builder = GraphBuilder::new(self.name, root);
        let mut pending = Vec::new();

        for project in self.projects {
            let project_path = normalize_path(&root.join(&project.path));
            let project_id = builder.add_project(project.name, project_path.clone())?;
            for entry in project.targets {
                let id = builder.add_target(project_id, entry.target)?;
                pending.push((id, project_path.clone(), entry.dependencies));
            }
        }

        for (id, project_path, dependencies) in pending {
            for dep in dependencies {
                let dep_project = match &dep.project {
                    Some(rel) => normalize_path(&project_path.join(rel)),
                    None => project_path.clone(),
                };
                let resolved = builder
                    .graph()
                    .find_target(&dep_project, &dep.target)
                    .ok_or_else(|| GraphError::UnknownDependency {
                        target: builder.graph().target(id).name.clone(),
                        project: project_path.clone(),
                        dependency: dep.describe(),
                    })?;
                builder.add_dependency(id, resolved);
            }
        }

        let graph = builder.build();
        tracing::debug!(
            targets = graph.len(),
            path = %root.display(),
            "resolved graph manifest"
        );
        Ok(graph)
    }
}

/// Folds `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
