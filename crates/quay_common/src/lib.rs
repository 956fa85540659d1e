//! Shared foundational types for the quay build-artifact cache.
//!
//! Provides the content digest used as a cache key and the composer that
//! folds ordered inputs into one digest.

#![warn(missing_docs)]

pub mod hash;

pub use hash::{ContentHash, HashComposer, ParseHashError};
