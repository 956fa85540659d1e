//! The `cache print-hashes` orchestration service.
//!
//! Ties together the configuration loader, the graph generator, and the
//! content-hash engine: resolve the profile, load the graph, hash it, and
//! report one entry per target.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use quay_common::ContentHash;
use quay_config::{resolve_configuration, resolve_profile, ConfigError, ConfigLoader};
use quay_graph::Generator;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::cancel::CancellationFlag;
use crate::engine::{GraphContentHasher, HashRequest, TargetFilter};
use crate::error::ServiceError;
use crate::output::CacheOutputType;

/// One reported target hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashEntry {
    /// Target name.
    pub name: String,
    /// Directory of the owning project.
    pub project: PathBuf,
    /// Final content hash.
    #[serde(serialize_with = "serialize_hex")]
    pub hash: ContentHash,
}

impl fmt::Display for HashEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.hash)
    }
}

fn serialize_hex<S: Serializer>(hash: &ContentHash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(hash)
}

/// Computes and reports the cache keys of a project's targets.
pub struct CachePrintHashesService<G, L, H> {
    generator: G,
    config_loader: L,
    graph_content_hasher: H,
    cancellation: CancellationFlag,
}

impl<G, L, H> CachePrintHashesService<G, L, H>
where
    G: Generator,
    L: ConfigLoader,
    H: GraphContentHasher,
{
    /// Creates a service from its three collaborators.
    pub fn new(generator: G, config_loader: L, graph_content_hasher: H) -> Self {
        Self {
            generator,
            config_loader,
            graph_content_hasher,
            cancellation: CancellationFlag::default(),
        }
    }

    /// Shares `cancellation` with every hashing pass this service starts.
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Hashes every target of the project at `path`.
    ///
    /// `xcframeworks` selects the output type. `profile` names a cache
    /// profile from the project configuration; an unknown name fails before
    /// the graph is loaded.
    pub fn run(
        &self,
        path: &Path,
        xcframeworks: bool,
        profile: Option<&str>,
    ) -> Result<Vec<HashEntry>, ServiceError> {
        self.run_with_filter(path, xcframeworks, profile, TargetFilter::All)
    }

    /// Like [`run`](Self::run), restricted to the targets selected by `filter`.
    pub fn run_with_filter(
        &self,
        path: &Path,
        xcframeworks: bool,
        profile: Option<&str>,
        filter: TargetFilter,
    ) -> Result<Vec<HashEntry>, ServiceError> {
        let started = Instant::now();

        let config = self.config_loader.load_config(path)?;
        let profile = match profile {
            Some(name) => Some(resolve_profile(&config, name).map_err(|e| match e {
                ConfigError::UnknownProfile(name) => ServiceError::ProfileNotFound {
                    name,
                    available: config.cache.profiles.iter().map(|p| p.name.clone()).collect(),
                },
                other => ServiceError::Config(other),
            })?),
            None => None,
        };
        let configuration = resolve_configuration(&config, profile);
        let output_type = CacheOutputType::from_xcframeworks(xcframeworks);
        info!(
            path = %path.display(),
            configuration,
            output = %output_type,
            profile = profile.map(|p| p.name.as_str()),
            "computing cache hashes"
        );

        self.cancellation.check()?;
        let graph = self.generator.load(path).map_err(ServiceError::GraphLoad)?;

        let request = HashRequest::new(configuration, output_type)
            .with_profile(profile)
            .with_targets(filter)
            .with_cancellation(self.cancellation.clone());
        let hashes = self.graph_content_hasher.content_hashes(&graph, &request)?;

        let mut entries: Vec<HashEntry> = hashes
            .into_iter()
            .map(|(id, hash)| HashEntry {
                name: graph.target(id).name.clone(),
                project: graph.project_of(id).path.clone(),
                hash,
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.project.cmp(&b.project)));

        info!(
            targets = entries.len(),
            "Total time taken: {:.3}s",
            started.elapsed().as_secs_f64()
        );
        Ok(entries)
    }
}
