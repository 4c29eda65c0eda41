//! Distance contract for opaque feature fingerprints.

use crate::core::model::FeatureFingerprint;
use crate::error::CompareError;

/// Distance between two fingerprints.
///
/// Implementations must be symmetric and deterministic. A failed call is
/// treated by every grouping algorithm as "not a duplicate" and is never
/// retried.
pub trait FingerprintMetric: Send + Sync {
    fn distance(&self, a: &FeatureFingerprint, b: &FeatureFingerprint) -> Result<f32, CompareError>;

    /// Human-readable description of the metric
    fn description(&self) -> String {
        "custom fingerprint metric".to_string()
    }
}

impl<F> FingerprintMetric for F
where
    F: Fn(&FeatureFingerprint, &FeatureFingerprint) -> Result<f32, CompareError> + Send + Sync,
{
    fn distance(&self, a: &FeatureFingerprint, b: &FeatureFingerprint) -> Result<f32, CompareError> {
        self(a, b)
    }
}

/// L2 distance over the descriptor values.
///
/// Descriptors of different length cannot be compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanMetric;

impl FingerprintMetric for EuclideanMetric {
    fn distance(&self, a: &FeatureFingerprint, b: &FeatureFingerprint) -> Result<f32, CompareError> {
        let (a, b) = (a.as_slice(), b.as_slice());
        if a.len() != b.len() {
            return Err(CompareError::DimensionMismatch {
                left: a.len(),
                right: b.len(),
            });
        }

        let distance = a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt();

        if distance.is_finite() {
            Ok(distance)
        } else {
            Err(CompareError::NonFiniteDistance)
        }
    }

    fn description(&self) -> String {
        "Euclidean distance between feature descriptors".to_string()
    }
}
