//! Average Hash (aHash) implementation.
//!
//! aHash works by:
//! 1. Resizing the image to 8x8
//! 2. Converting to grayscale
//! 3. Computing the mean brightness of all 64 pixels
//! 4. For each pixel (row-major): if brighter than the mean, set bit to 1, else 0
//!
//! This is the fastest hash but less robust to edits.

use super::super::traits::{pack_bits, HashAlgorithm, HashAlgorithmKind, LumaGrid, PerceptualHash};

const GRID: u32 = 8;

/// Average Hash (aHash) implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct AverageHasher;

impl AverageHasher {
    /// Create a new aHash hasher
    pub fn new() -> Self {
        Self
    }
}

impl HashAlgorithm for AverageHasher {
    fn grid_size(&self) -> (u32, u32) {
        (GRID, GRID)
    }

    fn hash_grid(&self, grid: &LumaGrid) -> PerceptualHash {
        let values = grid.values();
        if values.is_empty() {
            return PerceptualHash::ZERO;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        pack_bits(values.iter().map(|&v| v > mean))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Average
    }
}
