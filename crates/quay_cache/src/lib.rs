//! Content-addressed cache keys for the targets of a project graph.
//!
//! A target's key covers its own files and settings, the keys of everything
//! it depends on, the build configuration, the output type, and (for
//! platform-specific artifacts) the device and OS of the selected cache
//! profile. [`CachePrintHashesService`] drives a full pass; the pieces are
//! usable on their own:
//!
//! - [`ContentHasher`] computes the own digest of one target
//! - [`GraphContentHasher`] composes final hashes over the dependency graph
//! - [`schedule`] orders targets into parallelizable levels

#![warn(missing_docs)]

pub mod cancel;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod output;
pub mod profile;
pub mod schedule;
pub mod service;

pub use cancel::CancellationFlag;
pub use engine::{
    CacheGraphContentHasher, GraphContentHasher, GraphHashes, HashRequest, TargetFilter,
};
pub use error::{CacheError, ServiceError};
pub use hasher::{canonical_settings, CanonicalSetting, ContentHasher, FsContentHasher};
pub use output::CacheOutputType;
pub use profile::is_profile_sensitive;
pub use service::{CachePrintHashesService, HashEntry};
