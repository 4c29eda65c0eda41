//! Difference Hash (dHash) implementation.
//!
//! dHash works by:
//! 1. Resizing the image to 9x8
//! 2. Converting to grayscale
//! 3. Comparing each pixel to the one to its right
//! 4. If left pixel is brighter, set bit to 1, else 0
//!
//! This captures the relative gradient of brightness changes.

use super::super::traits::{pack_bits, HashAlgorithm, HashAlgorithmKind, LumaGrid, PerceptualHash};

const WIDTH: u32 = 9;
const HEIGHT: u32 = 8;

/// Difference Hash (dHash) implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct DifferenceHasher;

impl DifferenceHasher {
    /// Create a new dHash hasher
    pub fn new() -> Self {
        Self
    }
}

impl HashAlgorithm for DifferenceHasher {
    fn grid_size(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn hash_grid(&self, grid: &LumaGrid) -> PerceptualHash {
        if grid.width() < 2 || grid.height() == 0 {
            return PerceptualHash::ZERO;
        }
        let pairs = (0..grid.height()).flat_map(|y| {
            (0..grid.width() - 1).map(move |x| grid.get(x, y) > grid.get(x + 1, y))
        });
        pack_bits(pairs)
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Difference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn create_gradient(descending: bool) -> DynamicImage {
        let img = ImageBuffer::from_fn(90, 80, |x, _| {
            let step = if descending { 89 - x } else { x };
            let brightness = (step * 255 / 89) as u8;
            Rgb([brightness, brightness, brightness])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn opposite_gradients_are_maximally_different() {
        let hasher = DifferenceHasher::new();

        let rising = hasher.hash_image(&create_gradient(false)).unwrap();
        let falling = hasher.hash_image(&create_gradient(true)).unwrap();

        assert_eq!(rising, PerceptualHash::ZERO);
        assert_eq!(falling.value(), u64::MAX);
    }

    #[test]
    fn grid_produces_one_bit_per_adjacent_pair() {
        // Only the first pair of the first row descends
        let mut values = vec![0.0; 72];
        values[0] = 10.0;
        let grid = LumaGrid::new(9, 8, values).unwrap();

        let hash = DifferenceHasher::new().hash_grid(&grid);
        assert_eq!(hash.value(), 1u64 << 63);
    }

    #[test]
    fn identical_images_produce_identical_hash() {
        let hasher = DifferenceHasher::new();
        let image = create_gradient(true);
        assert_eq!(hasher.hash_image(&image).unwrap(), hasher.hash_image(&image).unwrap());
    }

    #[test]
    fn kind_returns_difference() {
        assert_eq!(DifferenceHasher::new().kind(), HashAlgorithmKind::Difference);
    }
}
