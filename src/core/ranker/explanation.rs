//! Human-readable reasons behind a keeper recommendation.

use super::RankedPhoto;
use serde::{Deserialize, Serialize};

const QUALITY_REASON: f64 = 0.7;
const SHARPNESS_REASON: f64 = 0.7;
const RESOLUTION_REASON: f64 = 0.8;
const RECENCY_REASON: f64 = 0.8;

/// Why a photo landed where it did in its group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingExplanation {
    /// One line, e.g. "Ranked #1 of 3 (score 0.82)"
    pub summary: String,
    /// Criteria on which the photo scored strongly
    pub reasons: Vec<String>,
}

impl RankingExplanation {
    pub fn for_photo(photo: &RankedPhoto, group_size: usize) -> Self {
        Self {
            summary: Self::generate_summary(photo, group_size),
            reasons: Self::dominant_reasons(photo),
        }
    }

    fn generate_summary(photo: &RankedPhoto, group_size: usize) -> String {
        if photo.rank == 1 {
            format!("Best of {} photos (score {:.2})", group_size, photo.total)
        } else {
            format!(
                "Ranked #{} of {} (score {:.2})",
                photo.rank, group_size, photo.total
            )
        }
    }

    fn dominant_reasons(photo: &RankedPhoto) -> Vec<String> {
        let scores = &photo.breakdown;
        let mut reasons = Vec::new();
        if scores.quality > QUALITY_REASON {
            reasons.push("High aesthetic quality".to_string());
        }
        if scores.sharpness > SHARPNESS_REASON {
            reasons.push("Sharp and in focus".to_string());
        }
        if scores.resolution > RESOLUTION_REASON {
            reasons.push("Highest resolution in the group".to_string());
        }
        if scores.recency > RECENCY_REASON {
            reasons.push("Most recent capture".to_string());
        }
        reasons
    }

    /// Summary followed by the reasons, comma separated
    pub fn human_readable(&self) -> String {
        if self.reasons.is_empty() {
            self.summary.clone()
        } else {
            format!("{}: {}", self.summary, self.reasons.join(", "))
        }
    }
}
