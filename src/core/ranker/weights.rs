//! Criterion weights for the ranker.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Named weight sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankingPreset {
    #[default]
    Balanced,
    QualityFocused,
    ResolutionFocused,
    RecencyFocused,
}

impl std::fmt::Display for RankingPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingPreset::Balanced => write!(f, "balanced"),
            RankingPreset::QualityFocused => write!(f, "quality-focused"),
            RankingPreset::ResolutionFocused => write!(f, "resolution-focused"),
            RankingPreset::RecencyFocused => write!(f, "recency-focused"),
        }
    }
}

/// Weight of each ranking criterion. Always sums to 1 after [`normalized`](Self::normalized).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub quality: f64,
    pub sharpness: f64,
    pub resolution: f64,
    pub recency: f64,
    pub file_size: f64,
    pub aspect_ratio: f64,
}

impl RankingWeights {
    pub fn balanced() -> Self {
        Self {
            quality: 0.35,
            sharpness: 0.25,
            resolution: 0.15,
            recency: 0.10,
            file_size: 0.10,
            aspect_ratio: 0.05,
        }
    }

    pub fn quality_focused() -> Self {
        Self {
            quality: 0.50,
            sharpness: 0.25,
            resolution: 0.10,
            recency: 0.05,
            file_size: 0.05,
            aspect_ratio: 0.05,
        }
    }

    pub fn resolution_focused() -> Self {
        Self {
            quality: 0.20,
            sharpness: 0.20,
            resolution: 0.35,
            recency: 0.10,
            file_size: 0.10,
            aspect_ratio: 0.05,
        }
    }

    pub fn recency_focused() -> Self {
        Self {
            quality: 0.20,
            sharpness: 0.15,
            resolution: 0.10,
            recency: 0.40,
            file_size: 0.10,
            aspect_ratio: 0.05,
        }
    }

    pub fn preset(preset: RankingPreset) -> Self {
        match preset {
            RankingPreset::Balanced => Self::balanced(),
            RankingPreset::QualityFocused => Self::quality_focused(),
            RankingPreset::ResolutionFocused => Self::resolution_focused(),
            RankingPreset::RecencyFocused => Self::recency_focused(),
        }
    }

    fn sum(&self) -> f64 {
        self.quality
            + self.sharpness
            + self.resolution
            + self.recency
            + self.file_size
            + self.aspect_ratio
    }

    /// Negative or non-finite weights become 0, then everything is scaled
    /// to sum to 1. A set with nothing left falls back to [`balanced`](Self::balanced).
    pub fn normalized(self) -> Self {
        let clean = |w: f64| if w.is_finite() { w.max(0.0) } else { 0.0 };
        let weights = Self {
            quality: clean(self.quality),
            sharpness: clean(self.sharpness),
            resolution: clean(self.resolution),
            recency: clean(self.recency),
            file_size: clean(self.file_size),
            aspect_ratio: clean(self.aspect_ratio),
        };

        let total = weights.sum();
        if total <= 0.0 {
            debug!("all ranking weights are zero, using balanced preset");
            return Self::balanced();
        }
        if (total - 1.0).abs() < 1e-9 {
            return weights;
        }

        debug!(total, "ranking weights rescaled to sum to 1");
        Self {
            quality: weights.quality / total,
            sharpness: weights.sharpness / total,
            resolution: weights.resolution / total,
            recency: weights.recency / total,
            file_size: weights.file_size / total,
            aspect_ratio: weights.aspect_ratio / total,
        }
    }
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self::balanced()
    }
}
