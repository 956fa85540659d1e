//! Stable index newtypes for graph entities.
//!
//! IDs are handed out by [`Arena::alloc`](crate::arena::Arena::alloc) while a
//! graph is built and stay valid for the lifetime of that graph. Dependency
//! edges are stored as IDs, so the arena is the only owner of a target.

use crate::arena::ArenaId;
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl ArenaId for $name {
            fn from_slot(slot: u32) -> Self {
                Self(slot)
            }

            fn slot(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Index of a [`Target`](crate::Target) inside a [`Graph`](crate::Graph).
    TargetId,
    "target"
);

define_id!(
    /// Index of a [`Project`](crate::Project) inside a [`Graph`](crate::Graph).
    ProjectId,
    "project"
);
