//! End-to-end tests for the curation engine.
//!
//! These tests verify behavior across modules:
//! - Duplicate and similarity grouping over one library
//! - Empty inputs at every grouping entry point
//! - Hashing real images
//! - Ranking the groups a scan produced

use image::{DynamicImage, ImageBuffer, Rgb};
use photo_curation::core::cluster::{Dbscan, HierarchicalClustering, Linkage, UnionFind};
use photo_curation::core::duplicates::{
    merge_overlapping_groups, DuplicateConfig, DuplicateDetector, EuclideanMetric,
};
use photo_curation::core::hasher::{are_similar, compute_hash, HashAlgorithmKind, PerceptualHash};
use photo_curation::core::model::{FeatureFingerprint, Group, PhotoId, PhotoRecord};
use photo_curation::core::pipeline::{CancellationToken, ScanSession};
use photo_curation::core::quality::QualityScore;
use photo_curation::core::ranker::BestPhotoRanker;
use photo_curation::core::similar::SimilarityGrouper;
use photo_curation::events::null_sender;

fn record(id: &str, fingerprint: [f32; 2], hash: u64) -> PhotoRecord {
    PhotoRecord::new(id, 4000, 3000, 2_000_000)
        .with_fingerprint(FeatureFingerprint::new(fingerprint.to_vec()))
        .with_hash(PerceptualHash::new(hash))
}

/// 1 & 2 share a near fingerprint, 3 & 4 a near hash, 5 matches nothing
fn library() -> Vec<PhotoRecord> {
    vec![
        record("1", [0.0, 0.0], 0xFFFF << 48),
        record("2", [0.2, 0.1], 0xFFFF << 16),
        record("3", [5.0, 5.0], 0),
        record("4", [9.0, 1.0], 0b101),
        record("5", [-7.0, 3.0], u64::MAX ^ 0xFFFF),
    ]
}

fn ids(groups: &[Group]) -> Vec<Vec<&str>> {
    groups
        .iter()
        .map(|g| g.members().iter().map(PhotoId::as_str).collect())
        .collect()
}

#[test]
fn duplicates_and_similar_photos_are_found_separately() {
    let photos = library();

    let detector = DuplicateDetector::new(EuclideanMetric, DuplicateConfig::default());
    let duplicates = detector.detect_records(&photos);
    assert_eq!(ids(&duplicates), vec![vec!["1", "2"]]);

    let similar = SimilarityGrouper::default().group_records(&photos);
    assert_eq!(ids(&similar), vec![vec!["3", "4"]]);

    let five = PhotoId::from("5");
    assert!(duplicates.iter().chain(&similar).all(|g| !g.contains(&five)));
}

#[test]
fn scan_agrees_with_batch_detectors() {
    let result = ScanSession::builder()
        .batch_size(2)
        .build()
        .run_records(&library(), EuclideanMetric, &null_sender(), &CancellationToken::new());

    assert_eq!(ids(&result.duplicate_groups), vec![vec!["1", "2"]]);
    assert_eq!(ids(&result.similar_groups), vec![vec!["3", "4"]]);
    assert_eq!(result.summary.photos_analyzed, 5);
    assert!(!result.cancelled);
}

#[test]
fn empty_input_returns_nothing_everywhere() {
    let detector = DuplicateDetector::new(EuclideanMetric, DuplicateConfig::default());
    assert!(detector.detect(&[]).is_empty());
    assert!(detector.detect_records(&[]).is_empty());
    assert!(detector
        .detect_batched(&[], &null_sender(), &CancellationToken::new())
        .is_empty());

    let grouper = SimilarityGrouper::default();
    assert!(grouper.group(&[]).is_empty());
    assert!(grouper.group_records(&[]).is_empty());
    assert!(grouper.group_dbscan(&[]).is_empty());

    assert!(merge_overlapping_groups(Vec::new()).is_empty());
    assert!(Dbscan::new(1.0, 2).fit(&[] as &[f64], |a, b| (a - b).abs()).is_empty());
    assert!(HierarchicalClustering::new(Linkage::Average, 1.0)
        .fit(&[] as &[f64], |a, b| (a - b).abs())
        .is_empty());
    assert!(UnionFind::<u32>::new().groups().is_empty());

    let result = ScanSession::builder().build().group_records(&[], EuclideanMetric);
    assert_eq!(result.summary.photos_analyzed, 0);
    assert!(result.duplicate_groups.is_empty());
    assert!(result.similar_groups.is_empty());

    assert!(BestPhotoRanker::default().rank(&[]).is_empty());
}

#[test]
fn scan_groups_are_ranked_by_quality() {
    let mut photos = library();
    photos[0] = photos[0].clone().with_quality(QualityScore::new(0.9, false, 0.9, 0.5));
    photos[1] = photos[1].clone().with_quality(QualityScore::new(-0.5, false, 0.2, 0.9));

    let result = ScanSession::builder().build().group_records(&photos, EuclideanMetric);
    let ranked = result.ranked_groups(&BestPhotoRanker::default());

    let (group, ranking) = &ranked[0];
    assert_eq!(ranking.keeper_id, PhotoId::from("1"));
    assert_eq!(group.selected_id, Some(PhotoId::from("1")));
    assert_eq!(
        BestPhotoRanker::default().select_for_deletion(&photos[..2], 1),
        vec![PhotoId::from("2")]
    );
}

/// Smooth waves on the red channel, gradients on the others
fn photo() -> DynamicImage {
    let img = ImageBuffer::from_fn(200, 150, |x, y| {
        let (fx, fy) = (x as f64, y as f64);
        let wave = 128.0 + 60.0 * (fx / 17.0).sin() + 40.0 * (fy / 13.0).cos()
            + 20.0 * ((fx + fy) / 23.0).sin();
        Rgb([wave as u8, (255 * x / 200) as u8, (255 * y / 150) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

#[test]
fn resized_copy_hashes_close_to_original() {
    let original = photo();
    let smaller = original.resize_exact(100, 75, image::imageops::FilterType::Triangle);

    for kind in [
        HashAlgorithmKind::Perceptual,
        HashAlgorithmKind::Average,
        HashAlgorithmKind::Difference,
    ] {
        let a = compute_hash(&original, kind).unwrap();
        let b = compute_hash(&smaller, kind).unwrap();
        assert!(
            are_similar(a, b, 8),
            "{kind}: distance {} too large",
            a.distance(&b)
        );
    }
}
