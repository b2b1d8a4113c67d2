//! Zone Boundary Index — maps a coordinate to its base IANA zone.
//!
//! Loads a polygon dataset once at startup and answers point-in-zone
//! queries with an R-tree envelope pre-filter followed by exact ring
//! membership. Read-only after load.
//!
//! # Tie-break policy
//!
//! A coordinate exactly on a shared edge, or inside overlapping
//! features, resolves to the feature with the lowest dataset ordinal.
//! This is a documented policy choice so that lookups stay
//! deterministic for a fixed dataset version.

mod dataset;
mod index;

pub use dataset::{BoundaryDataset, BoundaryFeature};
pub use index::{BoundaryError, BoundaryIndex};
