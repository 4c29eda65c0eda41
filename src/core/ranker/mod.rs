//! # Ranker Module
//!
//! Picks the photo to keep from a duplicate or similar group.
//!
//! Every criterion is scored in `[0, 1]` relative to the other members of
//! the group, then combined with [`RankingWeights`]:
//!
//! | Criterion    | Score                                                  |
//! |--------------|--------------------------------------------------------|
//! | quality      | normalised aesthetic, 0 for utility, 0.5 if unscored   |
//! | sharpness    | blur score, 0.5 if unscored                            |
//! | resolution   | pixel area / largest area in the group                 |
//! | recency      | position of the capture date between oldest and newest |
//! | file size    | bytes / largest file in the group                      |
//! | aspect ratio | closeness to a standard photo ratio                    |
//!
//! Ranking is a read-only query over a snapshot of the group.

mod explanation;
mod weights;

pub use explanation::RankingExplanation;
pub use weights::{RankingPreset, RankingWeights};

use crate::core::model::{Group, PhotoId, PhotoRecord};
use crate::core::quality::normalize_aesthetic;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Width / height ratios that count as "standard"
const STANDARD_RATIOS: [f64; 7] = [
    1.0,
    4.0 / 3.0,
    3.0 / 2.0,
    16.0 / 9.0,
    3.0 / 4.0,
    2.0 / 3.0,
    9.0 / 16.0,
];

/// Score used when a criterion has nothing to go on
const NEUTRAL_SCORE: f64 = 0.5;

/// Per-criterion scores for one photo, each in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub quality: f64,
    pub sharpness: f64,
    pub resolution: f64,
    pub recency: f64,
    pub file_size: f64,
    pub aspect_ratio: f64,
}

impl ScoreBreakdown {
    fn weighted(&self, weights: &RankingWeights) -> f64 {
        self.quality * weights.quality
            + self.sharpness * weights.sharpness
            + self.resolution * weights.resolution
            + self.recency * weights.recency
            + self.file_size * weights.file_size
            + self.aspect_ratio * weights.aspect_ratio
    }
}

/// A photo with its position in the group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPhoto {
    pub id: PhotoId,
    /// 1-based, 1 is the keeper
    pub rank: usize,
    pub total: f64,
    pub breakdown: ScoreBreakdown,
}

/// Recommendation for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRanking {
    pub keeper_id: PhotoId,
    /// Best first
    pub ranked: Vec<RankedPhoto>,
    pub explanation: RankingExplanation,
}

/// Multi-criteria ranking of the photos in a group
#[derive(Debug, Clone, Default)]
pub struct BestPhotoRanker {
    weights: RankingWeights,
}

impl BestPhotoRanker {
    /// Create a ranker; the weights are normalised to sum to 1
    pub fn new(weights: RankingWeights) -> Self {
        Self {
            weights: weights.normalized(),
        }
    }

    pub fn with_preset(preset: RankingPreset) -> Self {
        Self::new(RankingWeights::preset(preset))
    }

    pub fn weights(&self) -> &RankingWeights {
        &self.weights
    }

    /// Score every photo against the rest of `photos`, in input order
    pub fn score(&self, photos: &[&PhotoRecord]) -> Vec<(ScoreBreakdown, f64)> {
        let max_area = photos.iter().map(|p| p.dimensions.area()).max().unwrap_or(0);
        let max_size = photos.iter().map(|p| p.file_size_bytes).max().unwrap_or(0);

        let timestamps = photos
            .iter()
            .filter_map(|p| p.creation_date.map(|d| d.timestamp_millis()));
        let oldest = timestamps.clone().min();
        let newest = timestamps.max();

        photos
            .iter()
            .map(|photo| {
                let breakdown = ScoreBreakdown {
                    quality: quality_score(photo),
                    sharpness: photo
                        .quality
                        .map(|q| q.blur_score.clamp(0.0, 1.0))
                        .unwrap_or(NEUTRAL_SCORE),
                    resolution: ratio(photo.dimensions.area(), max_area),
                    recency: recency_score(photo, oldest, newest),
                    file_size: ratio(photo.file_size_bytes, max_size),
                    aspect_ratio: aspect_ratio_score(photo),
                };
                (breakdown, breakdown.weighted(&self.weights))
            })
            .collect()
    }

    /// Rank photos best first. Equal totals keep their input order.
    pub fn rank(&self, photos: &[PhotoRecord]) -> Vec<RankedPhoto> {
        let refs: Vec<&PhotoRecord> = photos.iter().collect();
        self.rank_refs(&refs)
    }

    fn rank_refs(&self, photos: &[&PhotoRecord]) -> Vec<RankedPhoto> {
        let mut ranked: Vec<RankedPhoto> = photos
            .iter()
            .zip(self.score(photos))
            .map(|(photo, (breakdown, total))| RankedPhoto {
                id: photo.id.clone(),
                rank: 0,
                total,
                breakdown,
            })
            .collect();

        // Stable sort
        ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
        for (position, photo) in ranked.iter_mut().enumerate() {
            photo.rank = position + 1;
        }
        ranked
    }

    /// Highest scoring photo; on a tie the earliest in input order
    pub fn select_best(&self, photos: &[PhotoRecord]) -> Option<PhotoId> {
        self.rank(photos).into_iter().next().map(|p| p.id)
    }

    /// Photos outside the top `keep`. `keep` is at least 1.
    pub fn select_for_deletion(&self, photos: &[PhotoRecord], keep: usize) -> Vec<PhotoId> {
        self.rank(photos)
            .into_iter()
            .skip(keep.max(1))
            .map(|p| p.id)
            .collect()
    }

    /// Rank the members of `group` found in `records`.
    ///
    /// Members with no record are left out of the ranking. `None` when no
    /// member has a record.
    pub fn rank_group(&self, group: &Group, records: &[PhotoRecord]) -> Option<GroupRanking> {
        let members: Vec<&PhotoRecord> = group
            .members()
            .iter()
            .filter_map(|id| records.iter().find(|r| &r.id == id))
            .collect();
        if members.len() < group.len() {
            debug!(
                group = %group.id,
                missing = group.len() - members.len(),
                "group members without a record left out of ranking"
            );
        }

        let ranked = self.rank_refs(&members);
        let keeper = ranked.first()?;
        let explanation = RankingExplanation::for_photo(keeper, ranked.len());

        Some(GroupRanking {
            keeper_id: keeper.id.clone(),
            explanation,
            ranked,
        })
    }
}

fn quality_score(photo: &PhotoRecord) -> f64 {
    match &photo.quality {
        Some(q) if q.is_utility => 0.0,
        Some(q) => normalize_aesthetic(q.aesthetic_score.clamp(-1.0, 1.0)),
        None => NEUTRAL_SCORE,
    }
}

fn ratio(value: u64, max: u64) -> f64 {
    if max == 0 {
        0.0
    } else {
        value as f64 / max as f64
    }
}

fn recency_score(photo: &PhotoRecord, oldest: Option<i64>, newest: Option<i64>) -> f64 {
    match (photo.creation_date, oldest, newest) {
        (Some(date), Some(oldest), Some(newest)) if newest > oldest => {
            (date.timestamp_millis() - oldest) as f64 / (newest - oldest) as f64
        }
        _ => NEUTRAL_SCORE,
    }
}

fn aspect_ratio_score(photo: &PhotoRecord) -> f64 {
    let Some(ratio) = photo.dimensions.aspect_ratio() else {
        return 0.0;
    };
    let closest = STANDARD_RATIOS
        .iter()
        .map(|standard| (ratio - standard).abs())
        .fold(f64::INFINITY, f64::min);
    (1.0 - closest).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::GroupKind;
    use crate::core::quality::QualityScore;
    use chrono::{Duration, TimeZone, Utc};

    fn create_record(id: &str, aesthetic: f64) -> PhotoRecord {
        PhotoRecord::new(id, 4000, 3000, 2_000_000)
            .with_quality(QualityScore::new(aesthetic, false, 0.5, 0.5))
    }

    fn three_qualities() -> Vec<PhotoRecord> {
        // Normalised qualities 0.2, 0.5 and 0.9
        vec![
            create_record("low", -0.6),
            create_record("mid", 0.0),
            create_record("high", 0.8),
        ]
    }

    #[test]
    fn best_quality_wins_with_default_weights() {
        let ranker = BestPhotoRanker::default();
        let photos = three_qualities();

        assert_eq!(ranker.select_best(&photos), Some(PhotoId::from("high")));

        let mut deleted = ranker.select_for_deletion(&photos, 1);
        deleted.sort();
        assert_eq!(deleted, vec![PhotoId::from("low"), PhotoId::from("mid")]);
    }

    #[test]
    fn ranks_are_one_based_and_descending() {
        let ranked = BestPhotoRanker::default().rank(&three_qualities());
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["high", "mid", "low"]);
        assert_eq!(ranked.iter().map(|p| p.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(ranked.windows(2).all(|w| w[0].total >= w[1].total));
    }

    #[test]
    fn ties_keep_input_order() {
        let photos = vec![create_record("first", 0.1), create_record("second", 0.1)];
        assert_eq!(
            BestPhotoRanker::default().select_best(&photos),
            Some(PhotoId::from("first"))
        );
    }

    #[test]
    fn deletion_always_keeps_one() {
        let ranker = BestPhotoRanker::default();
        let photos = three_qualities();

        assert_eq!(ranker.select_for_deletion(&photos, 0).len(), 2);
        assert_eq!(ranker.select_for_deletion(&photos, 2), vec![PhotoId::from("low")]);
        assert!(ranker.select_for_deletion(&photos, 10).is_empty());
        assert!(ranker.select_for_deletion(&[], 1).is_empty());
        assert_eq!(ranker.select_best(&[]), None);
    }

    #[test]
    fn sub_scores_are_relative_to_the_group() {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let photos = vec![
            PhotoRecord::new("small", 2000, 1500, 500_000).with_creation_date(base),
            PhotoRecord::new("large", 4000, 3000, 1_000_000)
                .with_creation_date(base + Duration::days(10)),
            PhotoRecord::new("undated", 4000, 3000, 250_000),
        ];
        let refs: Vec<&PhotoRecord> = photos.iter().collect();
        let scores = BestPhotoRanker::default().score(&refs);

        let (small, _) = scores[0];
        assert!((small.resolution - 0.25).abs() < 1e-12);
        assert!((small.file_size - 0.5).abs() < 1e-12);
        assert_eq!(small.recency, 0.0);
        assert_eq!(small.quality, NEUTRAL_SCORE);
        assert_eq!(small.sharpness, NEUTRAL_SCORE);
        assert!((small.aspect_ratio - 1.0).abs() < 1e-12);

        let (large, _) = scores[1];
        assert_eq!(large.recency, 1.0);
        assert_eq!(large.resolution, 1.0);

        let (undated, _) = scores[2];
        assert_eq!(undated.recency, NEUTRAL_SCORE);
    }

    #[test]
    fn utility_photos_score_zero_quality() {
        let photo = PhotoRecord::new("receipt", 1000, 1000, 1)
            .with_quality(QualityScore::new(1.0, true, 1.0, 0.5));
        assert_eq!(quality_score(&photo), 0.0);
    }

    #[test]
    fn odd_aspect_ratios_score_low() {
        let panorama = PhotoRecord::new("pano", 4000, 1000, 1);
        // 4.0 is 2.22 away from 16:9
        assert_eq!(aspect_ratio_score(&panorama), 0.0);

        let flat = PhotoRecord::new("flat", 4000, 0, 1);
        assert_eq!(aspect_ratio_score(&flat), 0.0);

        let nearly_square = PhotoRecord::new("sq", 1100, 1000, 1);
        assert!((aspect_ratio_score(&nearly_square) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn rank_group_picks_keeper_and_explains() {
        let photos = three_qualities();
        let group = Group::new(
            GroupKind::Similar,
            ["low", "high", "ghost"].map(PhotoId::from),
        );

        let ranking = BestPhotoRanker::default().rank_group(&group, &photos).unwrap();
        assert_eq!(ranking.keeper_id, PhotoId::from("high"));
        assert_eq!(ranking.ranked.len(), 2);
        assert!(ranking.explanation.summary.starts_with("Best of 2 photos"));
        assert!(ranking
            .explanation
            .reasons
            .contains(&"High aesthetic quality".to_string()));

        let selected = group.with_selection(ranking.keeper_id.clone());
        assert_eq!(selected.selected_id, Some(PhotoId::from("high")));
    }

    #[test]
    fn rank_group_without_records_is_none() {
        let group = Group::new(GroupKind::Duplicate, ["a", "b"].map(PhotoId::from));
        assert!(BestPhotoRanker::default().rank_group(&group, &[]).is_none());
    }

    #[test]
    fn preset_changes_the_winner() {
        let base = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let photos = vec![
            PhotoRecord::new("older-better", 4000, 3000, 1_000_000)
                .with_creation_date(base)
                .with_quality(QualityScore::new(0.6, false, 0.8, 0.5)),
            PhotoRecord::new("newer", 4000, 3000, 1_000_000)
                .with_creation_date(base + Duration::days(365))
                .with_quality(QualityScore::new(0.2, false, 0.6, 0.5)),
        ];

        assert_eq!(
            BestPhotoRanker::default().select_best(&photos),
            Some(PhotoId::from("older-better"))
        );
        assert_eq!(
            BestPhotoRanker::with_preset(RankingPreset::RecencyFocused).select_best(&photos),
            Some(PhotoId::from("newer"))
        );
    }
}
