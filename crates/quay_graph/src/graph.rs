//! The project dependency graph.
//!
//! A [`Graph`] owns every [`Project`] and [`Target`] in two arenas. Dependency
//! edges point from a dependent to its dependencies and are stored as
//! [`TargetId`] lists, so the structure has no owning references between
//! targets. Graphs are immutable once [`GraphBuilder::build`] returns and can be
//! shared across hashing workers without synchronization.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::arena::Arena;
use crate::error::GraphError;
use crate::ids::{ProjectId, TargetId};
use crate::target::Target;

/// A project: a directory that owns a set of targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Display name.
    pub name: String,
    /// Project directory. Target file references resolve against it.
    pub path: PathBuf,
    /// Targets declared by this project, in declaration order.
    pub targets: Vec<TargetId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TargetNode {
    target: Target,
    project: ProjectId,
    dependencies: Vec<TargetId>,
}

/// An immutable graph of targets across one or more projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    name: String,
    path: PathBuf,
    projects: Arena<ProjectId, Project>,
    targets: Arena<TargetId, TargetNode>,
}

impl Graph {
    /// Graph (workspace) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory the graph was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if the graph has no targets.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// All target IDs in insertion order.
    pub fn target_ids(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.targets.ids()
    }

    /// All `(ID, target)` pairs in insertion order.
    pub fn targets(&self) -> impl Iterator<Item = (TargetId, &Target)> {
        self.targets.iter().map(|(id, node)| (id, &node.target))
    }

    /// All `(ID, project)` pairs in insertion order.
    pub fn projects(&self) -> impl Iterator<Item = (ProjectId, &Project)> {
        self.projects.iter()
    }

    /// The target stored under `id`.
    pub fn target(&self, id: TargetId) -> &Target {
        &self.targets[id].target
    }

    /// The project stored under `id`.
    pub fn project(&self, id: ProjectId) -> &Project {
        &self.projects[id]
    }

    /// The project that owns target `id`.
    pub fn project_of(&self, id: TargetId) -> &Project {
        &self.projects[self.targets[id].project]
    }

    /// Direct dependencies of `id`, in declaration order.
    pub fn dependencies(&self, id: TargetId) -> &[TargetId] {
        &self.targets[id].dependencies
    }

    /// Looks a target up by owning project path and name.
    pub fn find_target(&self, project_path: &Path, name: &str) -> Option<TargetId> {
        let (_, project) = self.projects.iter().find(|(_, p)| p.path == project_path)?;
        project
            .targets
            .iter()
            .copied()
            .find(|&id| self.target(id).name == name)
    }

    /// All targets named `name`, in any project.
    pub fn find_by_name(&self, name: &str) -> Vec<TargetId> {
        self.targets()
            .filter(|(_, t)| t.name == name)
            .map(|(id, _)| id)
            .collect()
    }

    /// The roots plus every target they transitively depend on.
    ///
    /// Terminates on cyclic graphs; each target is visited once.
    pub fn reachable_from(&self, roots: &[TargetId]) -> BTreeSet<TargetId> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<TargetId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if visited.insert(id) {
                stack.extend(self.dependencies(id).iter().copied());
            }
        }
        visited
    }
}

/// Incremental constructor for a [`Graph`].
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    /// Starts an empty graph.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            graph: Graph {
                name: name.into(),
                path: path.into(),
                projects: Arena::default(),
                targets: Arena::default(),
            },
        }
    }

    /// Adds a project. Project paths must be unique.
    pub fn add_project(
        &mut self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<ProjectId, GraphError> {
        let path = path.into();
        if self.graph.projects.iter().any(|(_, p)| p.path == path) {
            return Err(GraphError::DuplicateProject { path });
        }
        Ok(self.graph.projects.alloc(Project {
            name: name.into(),
            path,
            targets: Vec::new(),
        }))
    }

    /// Adds a target to `project`. Target names must be unique per project.
    pub fn add_target(
        &mut self,
        project: ProjectId,
        target: Target,
    ) -> Result<TargetId, GraphError> {
        let owner = &self.graph.projects[project];
        if owner
            .targets
            .iter()
            .any(|&id| self.graph.target(id).name == target.name)
        {
            return Err(GraphError::DuplicateTarget {
                project: owner.path.clone(),
                name: target.name,
            });
        }
        let id = self.graph.targets.alloc(TargetNode {
            target,
            project,
            dependencies: Vec::new(),
        });
        if let Some(owner) = self.graph.projects.get_mut(project) {
            owner.targets.push(id);
        }
        Ok(id)
    }

    /// Records that `dependent` depends on `dependency`.
    ///
    /// Repeated edges are ignored. Cycles are accepted here and rejected by
    /// consumers that need a topological order.
    pub fn add_dependency(&mut self, dependent: TargetId, dependency: TargetId) {
        if let Some(node) = self.graph.targets.get_mut(dependent) {
            if !node.dependencies.contains(&dependency) {
                node.dependencies.push(dependency);
            }
        }
    }

    /// Read access to the graph under construction.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Finishes construction.
    pub fn build(self) -> Graph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Product;

    fn chain() -> (Graph, TargetId, TargetId, TargetId) {
        let mut b = GraphBuilder::new("ws", "/ws");
        let p = b.add_project("App", "/ws/App").unwrap();
        let a = b.add_target(p, Target::new("A", Product::App)).unwrap();
        let bb = b.add_target(p, Target::new("B", Product::Framework)).unwrap();
        let c = b.add_target(p, Target::new("C", Product::Framework)).unwrap();
        b.add_dependency(a, bb);
        b.add_dependency(bb, c);
        (b.build(), a, bb, c)
    }

    #[test]
    fn lookups() {
        let (g, a, bb, _) = chain();
        assert_eq!(g.len(), 3);
        assert_eq!(g.target(a).name, "A");
        assert_eq!(g.project_of(a).name, "App");
        assert_eq!(g.dependencies(a), &[bb]);
        assert_eq!(g.find_target(Path::new("/ws/App"), "B"), Some(bb));
        assert_eq!(g.find_target(Path::new("/ws/Other"), "B"), None);
        assert_eq!(g.find_by_name("C").len(), 1);
    }

    #[test]
    fn reachable_is_transitive() {
        let (g, a, bb, c) = chain();
        let all: Vec<_> = g.reachable_from(&[a]).into_iter().collect();
        assert_eq!(all, vec![a, bb, c]);
        let tail: Vec<_> = g.reachable_from(&[bb]).into_iter().collect();
        assert_eq!(tail, vec![bb, c]);
    }

    #[test]
    fn reachable_terminates_on_cycle() {
        let mut b = GraphBuilder::new("ws", "/ws");
        let p = b.add_project("P", "/ws/P").unwrap();
        let x = b.add_target(p, Target::new("X", Product::Framework)).unwrap();
        let y = b.add_target(p, Target::new("Y", Product::Framework)).unwrap();
        b.add_dependency(x, y);
        b.add_dependency(y, x);
        let g = b.build();
        assert_eq!(g.reachable_from(&[x]).len(), 2);
    }

    #[test]
    fn duplicate_target_rejected() {
        let mut b = GraphBuilder::new("ws", "/ws");
        let p = b.add_project("P", "/ws/P").unwrap();
        b.add_target(p, Target::new("X", Product::Framework)).unwrap();
        let err = b
            .add_target(p, Target::new("X", Product::StaticLibrary))
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateTarget { .. }));
    }

    #[test]
    fn same_name_in_two_projects_is_allowed() {
        let mut b = GraphBuilder::new("ws", "/ws");
        let p = b.add_project("P", "/ws/P").unwrap();
        let q = b.add_project("Q", "/ws/Q").unwrap();
        b.add_target(p, Target::new("X", Product::Framework)).unwrap();
        b.add_target(q, Target::new("X", Product::Framework)).unwrap();
        assert_eq!(b.build().find_by_name("X").len(), 2);
    }

    #[test]
    fn duplicate_project_rejected() {
        let mut b = GraphBuilder::new("ws", "/ws");
        b.add_project("P", "/ws/P").unwrap();
        assert!(matches!(
            b.add_project("P2", "/ws/P"),
            Err(GraphError::DuplicateProject { .. })
        ));
    }

    #[test]
    fn repeated_edges_are_collapsed() {
        let mut b = GraphBuilder::new("ws", "/ws");
        let p = b.add_project("P", "/ws/P").unwrap();
        let x = b.add_target(p, Target::new("X", Product::App)).unwrap();
        let y = b.add_target(p, Target::new("Y", Product::Framework)).unwrap();
        b.add_dependency(x, y);
        b.add_dependency(x, y);
        assert_eq!(b.build().dependencies(x).len(), 1);
    }
}
