//! # Cluster Module
//!
//! Generic clustering primitives, independent of any photo type.
//!
//! Every algorithm is parametric over the element type and takes the
//! distance as an injected closure, so they can be tested in isolation
//! with plain numbers or points. The closure must be symmetric and
//! deterministic.
//!
//! ## Algorithms
//! - [`UnionFind`] - disjoint sets with path compression and union by rank
//! - [`Dbscan`] - density-based clustering with noise detection
//! - [`HierarchicalClustering`] - agglomerative merging under a linkage rule

mod dbscan;
mod hierarchical;
mod union_find;

pub use dbscan::{Dbscan, PointLabel};
pub use hierarchical::{HierarchicalClustering, Linkage};
pub use union_find::UnionFind;

use serde::{Deserialize, Serialize};

/// A cluster produced by [`Dbscan`] or [`HierarchicalClustering`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster<T> {
    /// Cluster identifier, unique within one clustering run
    pub id: usize,
    /// Members in input order
    pub members: Vec<T>,
}

impl<T> Cluster<T> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
