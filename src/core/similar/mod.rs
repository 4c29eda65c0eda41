//! # Similar Photos Module
//!
//! Finds photos that are visually similar but not necessarily duplicates.
//!
//! ## Strategies
//! - **Greedy** - seed-based single pass on Hamming distance
//!   (default threshold 8 of 64 bits)
//! - **Two-stage** - greedy, additionally requiring embedding cosine
//!   similarity of at least 0.85 where both photos have an embedding
//! - **DBSCAN** - density clustering on Hamming distance, catches chains
//! - **Hierarchical** - agglomerative merging under a linkage rule
//!
//! ## Use Cases
//! - Find burst shots that are slightly different
//! - Discover photos of the same scene from different angles
//! - Group related images for review

mod embedding;
mod grouper;
mod types;

pub use embedding::cosine_similarity;
pub use grouper::{similarity_summary, SimilarityGrouper};
pub use types::{
    MatchType, SimilarConfig, SimilaritySummary, DEFAULT_EMBEDDING_THRESHOLD, DEFAULT_MIN_POINTS,
};
