//! The project dependency graph consumed by the content-hash engine.
//!
//! Targets and projects live in ID-indexed arenas; dependency edges are
//! [`TargetId`] lists. Graphs are loaded through the [`Generator`] trait, with
//! [`ManifestGenerator`] reading a `graph.json` description from disk.

#![warn(missing_docs)]

pub mod arena;
pub mod error;
pub mod generator;
pub mod graph;
pub mod ids;
pub mod manifest;
pub mod target;

pub use arena::ArenaId;
pub use error::GraphError;
pub use generator::{Generator, LoadError, ManifestGenerator, GRAPH_MANIFEST_FILE};
pub use graph::{Graph, GraphBuilder, Project};
pub use ids::{ProjectId, TargetId};
pub use manifest::{DependencyRef, GraphManifest, ProjectManifest, TargetManifest};
pub use target::{BuildSettings, Headers, Product, SettingValue, Target};
