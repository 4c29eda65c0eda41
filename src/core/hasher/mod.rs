//! # Hasher Module
//!
//! Computes 64-bit perceptual hashes for images.
//!
//! ## Supported Algorithms
//! - **pHash (Perceptual Hash)** - 32x32 DCT, most robust to edits
//! - **aHash (Average Hash)** - 8x8 mean threshold, fastest
//! - **dHash (Difference Hash)** - 9x8 horizontal gradients
//!
//! ## How It Works
//! 1. Downscale the image (SIMD-accelerated via `fast_image_resize`)
//! 2. Convert to Rec. 601 luma
//! 3. Compute hash bits from pixel or frequency relationships
//! 4. Compare hashes using Hamming distance
//!
//! Every function here is pure, so hashing is freely parallel across photos.
//!
//! ## Example
//! ```rust,ignore
//! use photo_curation::core::hasher::{compute_hash, hamming_distance, HashAlgorithmKind};
//!
//! let a = compute_hash(&image_a, HashAlgorithmKind::Perceptual)?;
//! let b = compute_hash(&image_b, HashAlgorithmKind::Perceptual)?;
//! let close = hamming_distance(a, b) <= 8;
//! ```

mod algorithms;
pub mod fast_resize;
mod traits;

pub use algorithms::{AverageHasher, DifferenceHasher, PerceptualHasher};
pub use traits::{
    are_similar, hamming_distance, similarity, HashAlgorithm, HashAlgorithmKind, LumaGrid,
    PerceptualHash, DEFAULT_SIMILARITY_THRESHOLD, HASH_BITS,
};

use crate::error::HashError;
use image::DynamicImage;
use rayon::prelude::*;

/// Configuration builder for hashers
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Algorithm to use
    algorithm: HashAlgorithmKind,
}

impl HasherConfig {
    /// Create a new hasher configuration with defaults (pHash)
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithmKind::Perceptual,
        }
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the hasher
    pub fn build(self) -> Box<dyn HashAlgorithm> {
        match self.algorithm {
            HashAlgorithmKind::Average => Box::new(AverageHasher::new()),
            HashAlgorithmKind::Difference => Box::new(DifferenceHasher::new()),
            HashAlgorithmKind::Perceptual => Box::new(PerceptualHasher::new()),
        }
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a single image with the given algorithm.
///
/// Degenerate images (a zero dimension) hash to [`PerceptualHash::ZERO`].
pub fn compute_hash(
    image: &DynamicImage,
    algorithm: HashAlgorithmKind,
) -> Result<PerceptualHash, HashError> {
    HasherConfig::new().algorithm(algorithm).build().hash_image(image)
}

/// Hash many images across the rayon pool, preserving input order.
pub fn hash_images_parallel(
    images: &[DynamicImage],
    algorithm: HashAlgorithmKind,
) -> Vec<Result<PerceptualHash, HashError>> {
    let hasher = HasherConfig::new().algorithm(algorithm).build();
    images.par_iter().map(|image| hasher.hash_image(image)).collect()
}
