//! # Duplicates Module
//!
//! Finds near-duplicate photos by comparing high-fidelity feature
//! fingerprints.
//!
//! ## How It Works
//! 1. Take each photo not yet grouped as a seed
//! 2. Absorb every later ungrouped photo whose fingerprint distance to the
//!    seed is within the threshold (first come, first served)
//! 3. Expose only groups with two or more members
//!
//! This costs O(n^2) distance calls. From 1000 photos up, seeds are
//! processed in chunks of 100 so progress can be reported and the scan
//! cancelled between chunks; the grouping itself is unchanged.
//!
//! ## Threshold
//! | Value | Meaning                         |
//! |-------|---------------------------------|
//! | 0.1   | Strictest accepted value        |
//! | 0.5   | Default                         |
//! | 1.0   | Loosest accepted value          |

mod detector;
mod merge;
mod traits;

pub use detector::{DuplicateDetector, BATCHED_MIN_PHOTOS, BATCH_CHUNK_SIZE};
pub use merge::{merge_overlapping, merge_overlapping_groups};
pub use traits::{EuclideanMetric, FingerprintMetric};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default fingerprint distance threshold
pub const DEFAULT_DUPLICATE_THRESHOLD: f32 = 0.5;
const MIN_DUPLICATE_THRESHOLD: f32 = 0.1;
const MAX_DUPLICATE_THRESHOLD: f32 = 1.0;

/// Configuration for duplicate detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDuplicateConfig")]
pub struct DuplicateConfig {
    threshold: f32,
}

impl DuplicateConfig {
    /// Threshold is clamped to `[0.1, 1.0]`; NaN falls back to the default
    pub fn new(threshold: f32) -> Self {
        let clamped = if threshold.is_nan() {
            DEFAULT_DUPLICATE_THRESHOLD
        } else {
            threshold.clamp(MIN_DUPLICATE_THRESHOLD, MAX_DUPLICATE_THRESHOLD)
        };
        if clamped != threshold {
            debug!(threshold, clamped, "duplicate threshold clamped");
        }
        Self { threshold: clamped }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_THRESHOLD)
    }
}

#[derive(Deserialize)]
struct RawDuplicateConfig {
    #[serde(default = "default_threshold")]
    threshold: f32,
}

fn default_threshold() -> f32 {
    DEFAULT_DUPLICATE_THRESHOLD
}

impl From<RawDuplicateConfig> for DuplicateConfig {
    fn from(raw: RawDuplicateConfig) -> Self {
        DuplicateConfig::new(raw.threshold)
    }
}
