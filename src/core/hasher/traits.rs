//! Hash value, luma grid and algorithm trait definitions.

use super::fast_resize::resize_to_luma;
use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Number of bits in a perceptual hash
pub const HASH_BITS: u32 = 64;

/// Default Hamming distance at or below which two hashes are "similar"
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 8;

/// A 64-bit perceptual fingerprint of an image.
///
/// Immutable; compared only through Hamming distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerceptualHash(u64);

impl PerceptualHash {
    /// Hash produced for degenerate (empty) images
    pub const ZERO: PerceptualHash = PerceptualHash(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Number of differing bits, in `0..=64`
    pub fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// `1 - distance / 64`
    pub fn similarity(&self, other: &Self) -> f64 {
        1.0 - self.distance(other) as f64 / HASH_BITS as f64
    }

    pub fn is_similar(&self, other: &Self, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }

    /// Sixteen lowercase hex digits
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .ok()
            .map(Self)
    }
}

impl From<u64> for PerceptualHash {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hamming distance between two hashes
pub fn hamming_distance(a: PerceptualHash, b: PerceptualHash) -> u32 {
    a.distance(&b)
}

/// Similarity in `[0, 1]`
pub fn similarity(a: PerceptualHash, b: PerceptualHash) -> f64 {
    a.similarity(&b)
}

/// True when the hashes differ in at most `threshold` bits
pub fn are_similar(a: PerceptualHash, b: PerceptualHash, threshold: u32) -> bool {
    a.is_similar(&b, threshold)
}

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithmKind {
    /// Average Hash (aHash) - Fast, good for exact duplicates
    Average,
    /// Difference Hash (dHash) - Good balance of speed and accuracy
    Difference,
    /// Perceptual Hash (pHash) - Most robust, handles edits well
    Perceptual,
}

impl HashAlgorithmKind {
    /// Get a human-readable description of the algorithm
    pub fn description(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Average => {
                "Average Hash (aHash) - Fast comparison based on average brightness"
            }
            HashAlgorithmKind::Difference => {
                "Difference Hash (dHash) - Compares brightness gradients between pixels"
            }
            HashAlgorithmKind::Perceptual => {
                "Perceptual Hash (pHash) - DCT-based, robust to edits and transformations"
            }
        }
    }
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithmKind::Average => write!(f, "aHash"),
            HashAlgorithmKind::Difference => write!(f, "dHash"),
            HashAlgorithmKind::Perceptual => write!(f, "pHash"),
        }
    }
}

/// A downscaled grayscale image, row-major.
///
/// Luma uses the Rec. 601 weights `0.299 R + 0.587 G + 0.114 B`.
#[derive(Debug, Clone, PartialEq)]
pub struct LumaGrid {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl LumaGrid {
    /// Build a grid from raw luma values.
    pub fn new(width: u32, height: u32, values: Vec<f64>) -> Result<Self, HashError> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(HashError::InvalidBuffer {
                reason: format!("expected {} luma values, got {}", expected, values.len()),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Build a grid from packed 8-bit RGB triples.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Result<Self, HashError> {
        let values = rgb
            .chunks_exact(3)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect();
        Self::new(width, height, values)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.values[(y * self.width + x) as usize]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Trait for hash algorithm implementations
pub trait HashAlgorithm: Send + Sync {
    /// Grid dimensions `(width, height)` the image is downscaled to
    fn grid_size(&self) -> (u32, u32);

    /// Compute the hash from an already-downscaled luma grid
    fn hash_grid(&self, grid: &LumaGrid) -> PerceptualHash;

    /// Get the algorithm kind
    fn kind(&self) -> HashAlgorithmKind;

    /// Compute a hash from a decoded image.
    ///
    /// Images with a zero dimension hash to [`PerceptualHash::ZERO`].
    fn hash_image(&self, image: &DynamicImage) -> Result<PerceptualHash, HashError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(PerceptualHash::ZERO);
        }
        let (width, height) = self.grid_size();
        let grid = resize_to_luma(image, width, height)?;
        Ok(self.hash_grid(&grid))
    }
}

/// Pack bits into a hash, first bit most significant.
pub(crate) fn pack_bits(bits: impl Iterator<Item = bool>) -> PerceptualHash {
    PerceptualHash(bits.fold(0u64, |acc, bit| (acc << 1) | bit as u64))
}
