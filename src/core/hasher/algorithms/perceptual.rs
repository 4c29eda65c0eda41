//! Perceptual Hash (pHash) implementation.
//!
//! pHash uses the Discrete Cosine Transform (DCT) to extract
//! frequency information from the image. This makes it more
//! robust to:
//! - Scaling
//! - Minor rotations
//! - Brightness/contrast changes
//! - Compression artifacts
//!
//! Steps: downscale to 32x32 luma, run a full 2-D DCT-II, keep the
//! top-left 8x8 block without the DC term (63 coefficients) and set
//! bit `i` when coefficient `i` is above their median.

use super::super::traits::{pack_bits, HashAlgorithm, HashAlgorithmKind, LumaGrid, PerceptualHash};
use std::f64::consts::PI;

const DCT_SIZE: usize = 32;
const BLOCK: usize = 8;

/// Perceptual Hash (pHash) implementation using DCT
pub struct PerceptualHasher {
    /// cos((2x + 1) u pi / 2N) for u, x in 0..N, scaled by the DCT-II normalisation
    basis: Vec<f64>,
}

impl PerceptualHasher {
    /// Create a new pHash hasher
    pub fn new() -> Self {
        let n = DCT_SIZE as f64;
        let mut basis = Vec::with_capacity(DCT_SIZE * DCT_SIZE);
        for u in 0..DCT_SIZE {
            let scale = if u == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            for x in 0..DCT_SIZE {
                let angle = (2.0 * x as f64 + 1.0) * u as f64 * PI / (2.0 * n);
                basis.push(scale * angle.cos());
            }
        }
        Self { basis }
    }

    /// Separable 2-D DCT: transform rows, then columns.
    fn dct_2d(&self, input: &[f64]) -> Vec<f64> {
        let n = DCT_SIZE;
        let mut rows = vec![0.0; n * n];
        for y in 0..n {
            let row = &input[y * n..(y + 1) * n];
            for u in 0..n {
                let basis = &self.basis[u * n..(u + 1) * n];
                rows[y * n + u] = row.iter().zip(basis).map(|(a, b)| a * b).sum();
            }
        }

        let mut out = vec![0.0; n * n];
        for u in 0..n {
            for v in 0..n {
                let basis = &self.basis[v * n..(v + 1) * n];
                out[v * n + u] = (0..n).map(|y| rows[y * n + u] * basis[y]).sum();
            }
        }
        out
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl HashAlgorithm for PerceptualHasher {
    fn grid_size(&self) -> (u32, u32) {
        (DCT_SIZE as u32, DCT_SIZE as u32)
    }

    fn hash_grid(&self, grid: &LumaGrid) -> PerceptualHash {
        if grid.width() as usize != DCT_SIZE || grid.height() as usize != DCT_SIZE {
            return PerceptualHash::ZERO;
        }

        let dct = self.dct_2d(grid.values());

        // Row-major over the low-frequency block, DC excluded
        let coefficients: Vec<f64> = (0..BLOCK)
            .flat_map(|v| (0..BLOCK).map(move |u| (u, v)))
            .filter(|&(u, v)| u != 0 || v != 0)
            .map(|(u, v)| dct[v * DCT_SIZE + u])
            .collect();

        let mut sorted = coefficients.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = sorted[sorted.len() / 2];

        pack_bits(coefficients.iter().map(|&c| c > median))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Perceptual
    }
}
