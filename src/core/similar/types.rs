//! Types for similar photo grouping.

use crate::core::hasher::DEFAULT_SIMILARITY_THRESHOLD;
use crate::core::model::PhotoId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default cosine similarity an embedding pair must reach
pub const DEFAULT_EMBEDDING_THRESHOLD: f32 = 0.85;

/// Default DBSCAN density for hash clustering
pub const DEFAULT_MIN_POINTS: usize = 2;

const MIN_HASH_THRESHOLD: u32 = 1;
const MAX_HASH_THRESHOLD: u32 = 32;

/// Configuration for similarity grouping.
///
/// Every setter clamps instead of rejecting, and so does deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSimilarConfig")]
pub struct SimilarConfig {
    /// Maximum Hamming distance, `[1, 32]`
    hash_threshold: u32,
    /// Minimum cosine similarity when both photos have embeddings, `[0, 1]`
    embedding_threshold: f32,
    /// Require embedding confirmation where available
    use_embeddings: bool,
    /// DBSCAN density, at least 1
    min_points: usize,
}

impl SimilarConfig {
    pub fn new() -> Self {
        Self {
            hash_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            embedding_threshold: DEFAULT_EMBEDDING_THRESHOLD,
            use_embeddings: true,
            min_points: DEFAULT_MIN_POINTS,
        }
    }

    pub fn with_hash_threshold(mut self, threshold: u32) -> Self {
        let clamped = threshold.clamp(MIN_HASH_THRESHOLD, MAX_HASH_THRESHOLD);
        if clamped != threshold {
            debug!(threshold, clamped, "hash threshold clamped");
        }
        self.hash_threshold = clamped;
        self
    }

    pub fn with_embedding_threshold(mut self, threshold: f32) -> Self {
        let clamped = if threshold.is_nan() {
            DEFAULT_EMBEDDING_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        if clamped != threshold {
            debug!(threshold, clamped, "embedding threshold clamped");
        }
        self.embedding_threshold = clamped;
        self
    }

    pub fn with_embeddings(mut self, enabled: bool) -> Self {
        self.use_embeddings = enabled;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points.max(1);
        self
    }

    pub fn hash_threshold(&self) -> u32 {
        self.hash_threshold
    }

    pub fn embedding_threshold(&self) -> f32 {
        self.embedding_threshold
    }

    pub fn uses_embeddings(&self) -> bool {
        self.use_embeddings
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }
}

impl Default for SimilarConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Unchecked wire form of [`SimilarConfig`]; missing fields take defaults
#[derive(Deserialize)]
#[serde(default)]
struct RawSimilarConfig {
    hash_threshold: u32,
    embedding_threshold: f32,
    use_embeddings: bool,
    min_points: usize,
}

impl Default for RawSimilarConfig {
    fn default() -> Self {
        Self {
            hash_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            embedding_threshold: DEFAULT_EMBEDDING_THRESHOLD,
            use_embeddings: true,
            min_points: DEFAULT_MIN_POINTS,
        }
    }
}

impl From<RawSimilarConfig> for SimilarConfig {
    fn from(raw: RawSimilarConfig) -> Self {
        SimilarConfig::new()
            .with_hash_threshold(raw.hash_threshold)
            .with_embedding_threshold(raw.embedding_threshold)
            .with_embeddings(raw.use_embeddings)
            .with_min_points(raw.min_points)
    }
}

/// Classification of a hash distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchType {
    /// Distance = 0, identical perceptual content
    Exact,
    /// Distance 1-4, virtually identical
    NearExact,
    /// Distance 5-10, likely the same scene
    Similar,
    /// Distance 11+, possibly related
    MaybeSimilar,
}

impl MatchType {
    /// Classify based on Hamming distance
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => MatchType::Exact,
            1..=4 => MatchType::NearExact,
            5..=10 => MatchType::Similar,
            _ => MatchType::MaybeSimilar,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "Exact Match"),
            MatchType::NearExact => write!(f, "Near-Exact Match"),
            MatchType::Similar => write!(f, "Similar"),
            MatchType::MaybeSimilar => write!(f, "Possibly Similar"),
        }
    }
}

/// How tightly a similar group hangs together, measured from its first member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilaritySummary {
    pub reference: PhotoId,
    /// Mean hash similarity of the other members to the reference, `[0, 1]`
    pub average_similarity: f64,
    /// Loosest classification among the members
    pub weakest_match: MatchType,
}
