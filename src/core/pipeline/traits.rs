//! Seam to the external vision models.

use crate::core::hasher::PerceptualHash;
use crate::core::model::{EmbeddingVector, FeatureFingerprint, PhotoRecord};
use crate::core::quality::QualityScore;
use crate::error::AnalysisError;

/// A photo waiting for analysis: its metadata plus whatever the extractor
/// reads pixels from
#[derive(Debug, Clone)]
pub struct PendingPhoto<P> {
    pub record: PhotoRecord,
    pub pixels: P,
}

impl<P> PendingPhoto<P> {
    pub fn new(record: PhotoRecord, pixels: P) -> Self {
        Self { record, pixels }
    }
}

/// Per-photo feature extraction.
///
/// Every step may fail on its own; a failure only removes that feature
/// from the photo. Implementations are called from several worker threads
/// at once.
pub trait FeatureExtractor<P>: Send + Sync {
    fn extract_fingerprint(&self, photo: &PendingPhoto<P>) -> Result<FeatureFingerprint, AnalysisError>;

    fn compute_embedding(&self, photo: &PendingPhoto<P>) -> Result<EmbeddingVector, AnalysisError>;

    fn assess_quality(&self, photo: &PendingPhoto<P>) -> Result<QualityScore, AnalysisError>;

    fn perceptual_hash(&self, photo: &PendingPhoto<P>) -> Result<PerceptualHash, AnalysisError>;
}

/// Run every extraction step the record still lacks.
///
/// Features already present on the record are kept as they are.
pub(crate) fn analyze<P, E>(extractor: &E, photo: &PendingPhoto<P>) -> (PhotoRecord, Vec<AnalysisError>)
where
    E: FeatureExtractor<P> + ?Sized,
{
    let mut record = photo.record.clone();
    let mut failures = Vec::new();

    if record.fingerprint.is_none() {
        match extractor.extract_fingerprint(photo) {
            Ok(fingerprint) => record.fingerprint = Some(fingerprint),
            Err(e) => failures.push(e),
        }
    }
    if record.hash.is_none() {
        match extractor.perceptual_hash(photo) {
            Ok(hash) => record.hash = Some(hash),
            Err(e) => failures.push(e),
        }
    }
    if record.embedding.is_none() {
        match extractor.compute_embedding(photo) {
            Ok(embedding) => record.embedding = Some(embedding),
            Err(e) => failures.push(e),
        }
    }
    if record.quality.is_none() {
        match extractor.assess_quality(photo) {
            Ok(quality) => record.quality = Some(quality),
            Err(e) => failures.push(e),
        }
    }

    (record, failures)
}
