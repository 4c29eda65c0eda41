//! # Quality Module
//!
//! Per-photo composite quality score and letter grade.
//!
//! The raw inputs (aesthetic, blur and exposure sub-scores plus the
//! utility flag) come from external vision models. This module only
//! combines them:
//!
//! ```text
//! composite = -1                                    if utility
//!           = 0.5 * (aesthetic + 1) / 2
//!           + 0.3 * blur
//!           + 0.2 * (1 - 2 * |exposure - 0.5|)      otherwise
//! ```

use crate::core::model::{PhotoId, PhotoRecord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

const AESTHETIC_WEIGHT: f64 = 0.5;
const SHARPNESS_WEIGHT: f64 = 0.3;
const EXPOSURE_WEIGHT: f64 = 0.2;

/// Default composite threshold below which a photo is "low quality"
pub const DEFAULT_LOW_QUALITY_THRESHOLD: f64 = 0.3;

/// Quality sub-scores for one photo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    /// Aesthetic judgement in `[-1, 1]`
    pub aesthetic_score: f64,
    /// Screenshots, receipts, documents and similar non-photographs
    pub is_utility: bool,
    /// Sharpness in `[0, 1]`, higher is sharper
    pub blur_score: f64,
    /// Exposure in `[0, 1]`, 0.5 is ideal
    pub exposure_score: f64,
}

/// Letter grade derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityGrade {
    A,
    B,
    C,
    D,
    F,
    Utility,
}

impl QualityGrade {
    fn from_composite(composite: f64) -> Self {
        match composite {
            c if c >= 0.8 => QualityGrade::A,
            c if c >= 0.6 => QualityGrade::B,
            c if c >= 0.4 => QualityGrade::C,
            c if c >= 0.2 => QualityGrade::D,
            _ => QualityGrade::F,
        }
    }
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityGrade::A => write!(f, "A"),
            QualityGrade::B => write!(f, "B"),
            QualityGrade::C => write!(f, "C"),
            QualityGrade::D => write!(f, "D"),
            QualityGrade::F => write!(f, "F"),
            QualityGrade::Utility => write!(f, "Utility"),
        }
    }
}

/// Map an aesthetic score from `[-1, 1]` to `[0, 1]`
pub fn normalize_aesthetic(aesthetic: f64) -> f64 {
    (aesthetic + 1.0) / 2.0
}

impl QualityScore {
    /// Build a score, clamping each input to its range
    pub fn new(aesthetic_score: f64, is_utility: bool, blur_score: f64, exposure_score: f64) -> Self {
        Self {
            aesthetic_score: aesthetic_score.clamp(-1.0, 1.0),
            is_utility,
            blur_score: blur_score.clamp(0.0, 1.0),
            exposure_score: exposure_score.clamp(0.0, 1.0),
        }
    }

    /// Weighted composite in `[-1, 1]`; exactly -1 for utility photos
    pub fn composite(&self) -> f64 {
        if self.is_utility {
            return -1.0;
        }
        let aesthetic = normalize_aesthetic(self.aesthetic_score.clamp(-1.0, 1.0));
        let blur = self.blur_score.clamp(0.0, 1.0);
        let exposure = 1.0 - 2.0 * (self.exposure_score.clamp(0.0, 1.0) - 0.5).abs();

        AESTHETIC_WEIGHT * aesthetic + SHARPNESS_WEIGHT * blur + EXPOSURE_WEIGHT * exposure
    }

    pub fn grade(&self) -> QualityGrade {
        if self.is_utility {
            QualityGrade::Utility
        } else {
            QualityGrade::from_composite(self.composite())
        }
    }

    pub fn is_sharp(&self) -> bool {
        self.blur_score >= 0.7
    }

    pub fn is_blurry(&self) -> bool {
        self.blur_score < 0.4
    }

    pub fn is_overexposed(&self) -> bool {
        self.exposure_score > 0.8
    }

    pub fn is_underexposed(&self) -> bool {
        self.exposure_score < 0.2
    }

    /// Human-readable list of the problems that apply
    pub fn issues(&self) -> Vec<&'static str> {
        let mut issues = Vec::new();
        if self.is_utility {
            issues.push("Looks like a screenshot or document");
        }
        if self.is_blurry() {
            issues.push("Image appears blurry");
        }
        if self.is_overexposed() {
            issues.push("Image is overexposed");
        }
        if self.is_underexposed() {
            issues.push("Image is underexposed");
        }
        issues
    }
}

/// Ids of photos whose composite score falls below `threshold`.
///
/// `threshold` is clamped to `[0, 1]`; NaN falls back to
/// [`DEFAULT_LOW_QUALITY_THRESHOLD`]. Photos without a quality score are
/// never reported. Input order is preserved.
pub fn low_quality_ids(records: &[PhotoRecord], threshold: f64) -> Vec<PhotoId> {
    let clamped = if threshold.is_nan() {
        DEFAULT_LOW_QUALITY_THRESHOLD
    } else {
        threshold.clamp(0.0, 1.0)
    };
    if clamped != threshold {
        debug!(threshold, clamped, "low-quality threshold clamped");
    }

    records
        .par_iter()
        .filter_map(|record| {
            let quality = record.quality.as_ref()?;
            (quality.composite() < clamped).then(|| record.id.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(aesthetic: f64, blur: f64, exposure: f64) -> QualityScore {
        QualityScore::new(aesthetic, false, blur, exposure)
    }

    #[test]
    fn utility_composite_is_always_minus_one() {
        for (aesthetic, blur, exposure) in [(1.0, 1.0, 0.5), (-1.0, 0.0, 0.0), (0.3, 0.6, 0.9)] {
            let quality = QualityScore::new(aesthetic, true, blur, exposure);
            assert_eq!(quality.composite(), -1.0);
            assert_eq!(quality.grade(), QualityGrade::Utility);
        }
    }

    #[test]
    fn perfect_photo_scores_one() {
        let quality = score(1.0, 1.0, 0.5);
        assert!((quality.composite() - 1.0).abs() < 1e-12);
        assert_eq!(quality.grade(), QualityGrade::A);
    }

    #[test]
    fn composite_weights_components() {
        // 0.5 * 0.5 + 0.3 * 0.5 + 0.2 * (1 - 2 * 0.25) = 0.25 + 0.15 + 0.1
        let quality = score(0.0, 0.5, 0.75);
        assert!((quality.composite() - 0.5).abs() < 1e-12);
        assert_eq!(quality.grade(), QualityGrade::C);
    }

    #[test]
    fn grade_boundaries() {
        assert_eq!(QualityGrade::from_composite(0.8), QualityGrade::A);
        assert_eq!(QualityGrade::from_composite(0.79), QualityGrade::B);
        assert_eq!(QualityGrade::from_composite(0.6), QualityGrade::B);
        assert_eq!(QualityGrade::from_composite(0.4), QualityGrade::C);
        assert_eq!(QualityGrade::from_composite(0.2), QualityGrade::D);
        assert_eq!(QualityGrade::from_composite(0.19), QualityGrade::F);
    }

    #[test]
    fn diagnostics_are_independent() {
        let blurry_and_dark = score(0.0, 0.1, 0.1);
        assert!(blurry_and_dark.is_blurry());
        assert!(blurry_and_dark.is_underexposed());
        assert!(!blurry_and_dark.is_sharp());
        assert!(!blurry_and_dark.is_overexposed());
        assert_eq!(blurry_and_dark.issues().len(), 2);

        let sharp_and_bright = score(0.0, 0.7, 0.85);
        assert!(sharp_and_bright.is_sharp());
        assert!(sharp_and_bright.is_overexposed());
        assert!(!sharp_and_bright.is_blurry());
    }

    #[test]
    fn constructor_clamps_inputs() {
        let quality = QualityScore::new(3.0, false, -1.0, 2.0);
        assert_eq!(quality.aesthetic_score, 1.0);
        assert_eq!(quality.blur_score, 0.0);
        assert_eq!(quality.exposure_score, 1.0);
    }

    #[test]
    fn low_quality_filter_keeps_order_and_skips_unscored() {
        let records = vec![
            PhotoRecord::new("good", 10, 10, 1).with_quality(score(1.0, 1.0, 0.5)),
            PhotoRecord::new("unscored", 10, 10, 1),
            PhotoRecord::new("receipt", 10, 10, 1)
                .with_quality(QualityScore::new(0.9, true, 0.9, 0.5)),
            PhotoRecord::new("bad", 10, 10, 1).with_quality(score(-1.0, 0.0, 0.0)),
        ];

        let ids = low_quality_ids(&records, DEFAULT_LOW_QUALITY_THRESHOLD);
        assert_eq!(ids, vec![PhotoId::from("receipt"), PhotoId::from("bad")]);
    }

    #[test]
    fn low_quality_threshold_is_clamped() {
        let records = vec![PhotoRecord::new("ok", 10, 10, 1).with_quality(score(0.0, 0.5, 0.75))];
        assert!(low_quality_ids(&records, -5.0).is_empty());
        assert_eq!(low_quality_ids(&records, 5.0).len(), 1);
    }

    #[test]
    fn nan_threshold_uses_default() {
        let records = vec![
            PhotoRecord::new("ok", 10, 10, 1).with_quality(score(0.0, 0.5, 0.75)),
            PhotoRecord::new("bad", 10, 10, 1).with_quality(score(-1.0, 0.0, 0.0)),
        ];
        assert_eq!(low_quality_ids(&records, f64::NAN), vec![PhotoId::from("bad")]);
    }
}
