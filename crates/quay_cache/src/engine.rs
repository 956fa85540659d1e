//! The graph content-hash engine.
//!
//! A target's final hash folds its own digest with the final hashes of its
//! direct dependencies, the configuration, the output type, and the profile
//! discriminant. Since dependency hashes are themselves final, any change
//! propagates to every transitive dependent.
//!
//! Targets are hashed level by level in topological order. Each level runs in
//! parallel; the results are merged into the hash map before the next level
//! starts, so workers only ever read completed entries.

use std::collections::{BTreeMap, BTreeSet};

use quay_common::{ContentHash, HashComposer};
use quay_config::CacheProfile;
use quay_graph::{Graph, TargetId};
use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::cancel::CancellationFlag;
use crate::error::CacheError;
use crate::hasher::{ContentHasher, FsContentHasher};
use crate::output::CacheOutputType;
use crate::profile::write_discriminant;
use crate::schedule::{target_order, topological_levels};

const TARGET_DOMAIN: &str = "quay-target-v1";

/// Final hashes keyed by target.
pub type GraphHashes = BTreeMap<TargetId, ContentHash>;

/// Which targets a hashing pass covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetFilter {
    /// Every target in the graph.
    #[default]
    All,
    /// The named targets and their transitive dependencies.
    Roots(Vec<String>),
}

/// Inputs of one hashing pass.
#[derive(Debug, Clone)]
pub struct HashRequest<'a> {
    /// Build configuration name.
    pub configuration: &'a str,
    /// Selected cache profile, if any.
    pub profile: Option<&'a CacheProfile>,
    /// Artifact kind being keyed.
    pub output_type: CacheOutputType,
    /// Targets to hash.
    pub targets: TargetFilter,
    /// Checked before every level and every target.
    pub cancellation: CancellationFlag,
}

impl<'a> HashRequest<'a> {
    /// A request covering all targets, without a profile.
    pub fn new(configuration: &'a str, output_type: CacheOutputType) -> Self {
        Self {
            configuration,
            profile: None,
            output_type,
            targets: TargetFilter::All,
            cancellation: CancellationFlag::default(),
        }
    }

    /// Sets the cache profile.
    pub fn with_profile(mut self, profile: Option<&'a CacheProfile>) -> Self {
        self.profile = profile;
        self
    }

    /// Restricts the targets hashed.
    pub fn with_targets(mut self, targets: TargetFilter) -> Self {
        self.targets = targets;
        self
    }

    /// Attaches a cancellation flag.
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// Computes final content hashes for the targets of a graph.
pub trait GraphContentHasher {
    /// Hashes the targets selected by `request`.
    ///
    /// Either every selected target gets a hash or an error is returned.
    fn content_hashes(
        &self,
        graph: &Graph,
        request: &HashRequest<'_>,
    ) -> Result<GraphHashes, CacheError>;
}

/// The default engine, parameterized over the own-digest hasher.
#[derive(Debug, Default, Clone)]
pub struct CacheGraphContentHasher<C = FsContentHasher> {
    content_hasher: C,
    jobs: Option<usize>,
}

impl<C: ContentHasher> CacheGraphContentHasher<C> {
    /// Creates an engine using rayon's global pool.
    pub fn new(content_hasher: C) -> Self {
        Self {
            content_hasher,
            jobs: None,
        }
    }

    /// Hashes on a dedicated pool of `jobs` threads. Zero means rayon's default.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    fn scope(
        &self,
        graph: &Graph,
        filter: &TargetFilter,
    ) -> Result<BTreeSet<TargetId>, CacheError> {
        match filter {
            TargetFilter::All => Ok(graph.target_ids().collect()),
            TargetFilter::Roots(names) => {
                let mut roots = Vec::new();
                for name in names {
                    let found = graph.find_by_name(name);
                    if found.is_empty() {
                        return Err(CacheError::UnknownTarget { name: name.clone() });
                    }
                    roots.extend(found);
                }
                Ok(graph.reachable_from(&roots))
            }
        }
    }

    fn hash_levels(
        &self,
        graph: &Graph,
        levels: &[Vec<TargetId>],
        request: &HashRequest<'_>,
    ) -> Result<GraphHashes, CacheError> {
        let mut hashes = GraphHashes::new();
        for (depth, level) in levels.iter().enumerate() {
            request.cancellation.check()?;
            debug!(depth, width = level.len(), "hashing level");

            let computed = level
                .par_iter()
                .map(|&id| {
                    request.cancellation.check()?;
                    let hash = self.hash_target(graph, id, &hashes, request)?;
                    Ok((id, hash))
                })
                .collect::<Result<Vec<_>, CacheError>>()?;
            hashes.extend(computed);
        }
        Ok(hashes)
    }

    fn hash_target(
        &self,
        graph: &Graph,
        id: TargetId,
        hashes: &GraphHashes,
        request: &HashRequest<'_>,
    ) -> Result<ContentHash, CacheError> {
        let target = graph.target(id);
        let own = self
            .content_hasher
            .own_digest(graph.project_of(id), target, request.configuration)?;

        let mut dependencies = graph.dependencies(id).to_vec();
        dependencies.sort_by(|a, b| target_order(graph, *a, *b));

        let mut composer = HashComposer::new(TARGET_DOMAIN);
        composer.write_hash(&own).write_count(dependencies.len());
        for dep in dependencies {
            let dep_hash = hashes.get(&dep).ok_or_else(|| CacheError::MissingDependencyHash {
                target: target.name.clone(),
                dependency: graph.target(dep).name.clone(),
            })?;
            composer.write_hash(dep_hash);
        }
        composer
            .write_str(request.configuration)
            .write_str(request.output_type.as_str());
        write_discriminant(&mut composer, target.product, request.output_type, request.profile);

        let hash = composer.finish();
        debug!(name = %target.name, %hash, "hashed target");
        Ok(hash)
    }
}

impl<C: ContentHasher> GraphContentHasher for CacheGraphContentHasher<C> {
    fn content_hashes(
        &self,
        graph: &Graph,
        request: &HashRequest<'_>,
    ) -> Result<GraphHashes, CacheError> {
        let span = info_span!(
            "content_hashes",
            configuration = request.configuration,
            output = %request.output_type,
            profile = request.profile.map(|p| p.name.as_str()),
        );
        let _enter = span.enter();

        let scope = self.scope(graph, &request.targets)?;
        let levels = topological_levels(graph, &scope)?;
        info!(targets = scope.len(), levels = levels.len(), "hashing graph");

        match self.jobs {
            Some(jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()
                    .map_err(|e| CacheError::ThreadPool {
                        reason: e.to_string(),
                    })?;
                pool.install(|| self.hash_levels(graph, &levels, request))
            }
            None => self.hash_levels(graph, &levels, request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quay_graph::{GraphBuilder, Product, Project, Target};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Own digest derived from the target name plus an optional override.
    #[derive(Default)]
    struct StubHasher {
        overrides: HashMap<String, &'static str>,
        calls: AtomicUsize,
        cancel_after: Option<(usize, CancellationFlag)>,
    }

    impl StubHasher {
        fn with_content(mut self, name: &str, content: &'static str) -> Self {
            self.overrides.insert(name.to_string(), content);
            self
        }
    }

    impl ContentHasher for StubHasher {
        fn own_digest(
            &self,
            _project: &Project,
            target: &Target,
            configuration: &str,
        ) -> Result<ContentHash, CacheError> {
            let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((limit, flag)) = &self.cancel_after {
                if calls >= *limit {
                    flag.cancel();
                }
            }
            let content = self.overrides.get(&target.name).copied().unwrap_or("default");
            let mut c = HashComposer::new("stub");
            c.write_str(&target.name).write_str(content).write_str(configuration);
            Ok(c.finish())
        }
    }

    struct FailingHasher;

    impl ContentHasher for FailingHasher {
        fn own_digest(
            &self,
            _: &Project,
            target: &Target,
            _: &str,
        ) -> Result<ContentHash, CacheError> {
            if target.name == "Broken" {
                return Err(CacheError::UnreadableSource {
                    target: target.name.clone(),
                    path: "/ws/Broken/missing.swift".into(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                });
            }
            Ok(ContentHash::from_bytes(target.name.as_bytes()))
        }
    }

    /// A depends on B and C; B and C depend on Core; Util is isolated.
    fn diamond(core_product: Product) -> (Graph, BTreeMap<&'static str, TargetId>) {
        let mut b = GraphBuilder::new("ws", "/ws");
        let p = b.add_project("P", "/ws/P").unwrap();
        let a = b.add_target(p, Target::new("A", Product::App)).unwrap();
        let bb = b.add_target(p, Target::new("B", Product::Framework)).unwrap();
        let c = b.add_target(p, Target::new("C", Product::Framework)).unwrap();
        let core = b.add_target(p, Target::new("Core", core_product)).unwrap();
        let util = b.add_target(p, Target::new("Util", Product::StaticLibrary)).unwrap();
        b.add_dependency(a, bb);
        b.add_dependency(a, c);
        b.add_dependency(bb, core);
        b.add_dependency(c, core);
        let ids = BTreeMap::from([("A", a), ("B", bb), ("C", c), ("Core", core), ("Util", util)]);
        (b.build(), ids)
    }

    fn hash_all(engine: &CacheGraphContentHasher<StubHasher>, graph: &Graph) -> GraphHashes {
        engine
            .content_hashes(graph, &HashRequest::new("Debug", CacheOutputType::Framework))
            .unwrap()
    }

    #[test]
    fn every_target_gets_a_hash() {
        let (graph, _) = diamond(Product::Framework);
        let engine = CacheGraphContentHasher::new(StubHasher::default());
        let hashes = hash_all(&engine, &graph);
        assert_eq!(hashes.len(), graph.len());
    }

    #[test]
    fn empty_graph_is_empty_mapping() {
        let graph = GraphBuilder::new("ws", "/ws").build();
        let engine = CacheGraphContentHasher::new(StubHasher::default());
        assert!(hash_all(&engine, &graph).is_empty());
    }

    #[test]
    fn hashing_is_deterministic_across_pool_sizes() {
        let (graph, _) = diamond(Product::Framework);
        let engine = || CacheGraphContentHasher::new(StubHasher::default());
        let global = hash_all(&engine(), &graph);
        let single = hash_all(&engine().with_jobs(1), &graph);
        let wide = hash_all(&engine().with_jobs(8), &graph);
        assert_eq!(global, single);
        assert_eq!(global, wide);
    }

    #[test]
    fn change_propagates_to_dependents_only() {
        let (graph, ids) = diamond(Product::Framework);
        let before = hash_all(&CacheGraphContentHasher::new(StubHasher::default()), &graph);
        let after = hash_all(
            &CacheGraphContentHasher::new(StubHasher::default().with_content("Core", "edited")),
            &graph,
        );

        for name in ["Core", "B", "C", "A"] {
            assert_ne!(before[&ids[name]], after[&ids[name]], "{name} should change");
        }
        assert_eq!(before[&ids["Util"]], after[&ids["Util"]]);
    }

    #[test]
    fn change_in_leaf_dependent_leaves_dependencies_alone() {
        let (graph, ids) = diamond(Product::Framework);
        let before = hash_all(&CacheGraphContentHasher::new(StubHasher::default()), &graph);
        let after = hash_all(
            &CacheGraphContentHasher::new(StubHasher::default().with_content("B", "edited")),
            &graph,
        );
        assert_ne!(before[&ids["B"]], after[&ids["B"]]);
        assert_ne!(before[&ids["A"]], after[&ids["A"]]);
        assert_eq!(before[&ids["C"]], after[&ids["C"]]);
        assert_eq!(before[&ids["Core"]], after[&ids["Core"]]);
    }

    #[test]
    fn dependency_declaration_order_does_not_matter() {
        let build = |reversed: bool| {
            let mut b = GraphBuilder::new("ws", "/ws");
            let p = b.add_project("P", "/ws/P").unwrap();
            let app = b.add_target(p, Target::new("App", Product::App)).unwrap();
            let x = b.add_target(p, Target::new("X", Product::Framework)).unwrap();
            let y = b.add_target(p, Target::new("Y", Product::Framework)).unwrap();
            if reversed {
                b.add_dependency(app, y);
                b.add_dependency(app, x);
            } else {
                b.add_dependency(app, x);
                b.add_dependency(app, y);
            }
            (b.build(), app)
        };
        let engine = CacheGraphContentHasher::new(StubHasher::default());
        let (forward, app) = build(false);
        let (backward, _) = build(true);
        assert_eq!(hash_all(&engine, &forward)[&app], hash_all(&engine, &backward)[&app]);
    }

    #[test]
    fn output_type_changes_every_hash() {
        let (graph, _) = diamond(Product::Framework);
        let engine = CacheGraphContentHasher::new(StubHasher::default());
        let framework = engine
            .content_hashes(&graph, &HashRequest::new("Debug", CacheOutputType::Framework))
            .unwrap();
        let xcframework = engine
            .content_hashes(&graph, &HashRequest::new("Debug", CacheOutputType::Xcframework))
            .unwrap();
        for (id, hash) in &framework {
            assert_ne!(hash, &xcframework[id]);
        }
    }

    #[test]
    fn configuration_changes_every_hash() {
        let (graph, _) = diamond(Product::Framework);
        let engine = CacheGraphContentHasher::new(StubHasher::default());
        let debug = hash_all(&engine, &graph);
        let release = engine
            .content_hashes(&graph, &HashRequest::new("Release", CacheOutputType::Framework))
            .unwrap();
        for (id, hash) in &debug {
            assert_ne!(hash, &release[id]);
        }
    }

    #[test]
    fn profile_only_affects_sensitive_targets() {
        let (graph, ids) = diamond(Product::UnitTests);
        let engine = CacheGraphContentHasher::new(StubHasher::default());
        let profile = CacheProfile::new("Simulator", "Debug")
            .with_device("iPhone 12")
            .with_os("15.0.0");

        let plain = hash_all(&engine, &graph);
        let profiled = engine
            .content_hashes(
                &graph,
                &HashRequest::new("Debug", CacheOutputType::Framework).with_profile(Some(&profile)),
            )
            .unwrap();

        assert_eq!(plain[&ids["Util"]], profiled[&ids["Util"]]);
        // Core is a test bundle; its dependents inherit the change.
        for name in ["Core", "B", "C", "A"] {
            assert_ne!(plain[&ids[name]], profiled[&ids[name]], "{name} should change");
        }
    }

    #[test]
    fn profile_name_does_not_enter_hash() {
        let (graph, _) = diamond(Product::Framework);
        let engine = CacheGraphContentHasher::new(StubHasher::default());
        let first = CacheProfile::new("First", "Debug").with_device("iPhone 12");
        let second = CacheProfile::new("Second", "Debug").with_device("iPhone 12");
        let first_request =
            HashRequest::new("Debug", CacheOutputType::Xcframework).with_profile(Some(&first));
        let second_request =
            HashRequest::new("Debug", CacheOutputType::Xcframework).with_profile(Some(&second));
        assert_eq!(
            engine.content_hashes(&graph, &first_request).unwrap(),
            engine.content_hashes(&graph, &second_request).unwrap()
        );
    }

    #[test]
    fn roots_filter_hashes_closure_only() {
        let (graph, ids) = diamond(Product::Framework);
        let engine = CacheGraphContentHasher::new(StubHasher::default());
        let all = hash_all(&engine, &graph);
        let request = HashRequest::new("Debug", CacheOutputType::Framework)
            .with_targets(TargetFilter::Roots(vec!["B".to_string()]));
        let subset = engine.content_hashes(&graph, &request).unwrap();

        assert_eq!(subset.keys().copied().collect::<Vec<_>>(), {
            let mut expected = vec![ids["B"], ids["Core"]];
            expected.sort();
            expected
        });
        assert_eq!(subset[&ids["B"]], all[&ids["B"]]);
    }

    #[test]
    fn unknown_root_errors() {
        let (graph, _) = diamond(Product::Framework);
        let engine = CacheGraphContentHasher::new(StubHasher::default());
        let request = HashRequest::new("Debug", CacheOutputType::Framework)
            .with_targets(TargetFilter::Roots(vec!["Nope".to_string()]));
        let err = engine.content_hashes(&graph, &request).unwrap_err();
        assert!(matches!(err, CacheError::UnknownTarget { ref name } if name == "Nope"));
    }

    #[test]
    fn cycle_returns_no_mapping() {
        let mut b = GraphBuilder::new("ws", "/ws");
        let p = b.add_project("P", "/ws/P").unwrap();
        let x = b.add_target(p, Target::new("X", Product::Framework)).unwrap();
        let y = b.add_target(p, Target::new("Y", Product::Framework)).unwrap();
        b.add_dependency(x, y);
        b.add_dependency(y, x);
        let graph = b.build();

        let engine = CacheGraphContentHasher::new(StubHasher::default());
        let err = engine
            .content_hashes(&graph, &HashRequest::new("Debug", CacheOutputType::Framework))
            .unwrap_err();
        assert!(matches!(err, CacheError::CyclicDependency { ref target, .. } if target == "X"));
        assert_eq!(engine.content_hasher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unreadable_source_aborts_pass() {
        let mut b = GraphBuilder::new("ws", "/ws");
        let p = b.add_project("P", "/ws/P").unwrap();
        let ok = b.add_target(p, Target::new("Ok", Product::Framework)).unwrap();
        let broken = b.add_target(p, Target::new("Broken", Product::Framework)).unwrap();
        b.add_dependency(ok, broken);
        let graph = b.build();

        let err = CacheGraphContentHasher::new(FailingHasher)
            .content_hashes(&graph, &HashRequest::new("Debug", CacheOutputType::Framework))
            .unwrap_err();
        assert!(matches!(
            err,
            CacheError::UnreadableSource { ref target, .. } if target == "Broken"
        ));
    }

    #[test]
    fn cancelled_before_start() {
        let (graph, _) = diamond(Product::Framework);
        let engine = CacheGraphContentHasher::new(StubHasher::default());
        let flag = CancellationFlag::new();
        flag.cancel();
        let request = HashRequest::new("Debug", CacheOutputType::Framework).with_cancellation(flag);
        assert!(matches!(
            engine.content_hashes(&graph, &request),
            Err(CacheError::Cancelled)
        ));
        assert_eq!(engine.content_hasher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancelled_mid_pass() {
        let (graph, _) = diamond(Product::Framework);
        let flag = CancellationFlag::new();
        let hasher = StubHasher {
            cancel_after: Some((1, flag.clone())),
            ..StubHasher::default()
        };
        let engine = CacheGraphContentHasher::new(hasher).with_jobs(1);
        let request = HashRequest::new("Debug", CacheOutputType::Framework).with_cancellation(flag);
        assert!(matches!(
            engine.content_hashes(&graph, &request),
            Err(CacheError::Cancelled)
        ));
        assert!(engine.content_hasher.calls.load(Ordering::SeqCst) < graph.len());
    }
}
