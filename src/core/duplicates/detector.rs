//! Greedy single-pass duplicate grouping, plain and chunked.

use super::traits::FingerprintMetric;
use super::DuplicateConfig;
use crate::core::model::{FeatureFingerprint, Group, GroupKind, PhotoId, PhotoRecord};
use crate::core::pipeline::CancellationToken;
use crate::events::{null_sender, Event, EventSender, GroupingEvent, GroupingProgress};
use rayon::prelude::*;
use tracing::{debug, info};

/// Photo count from which [`DuplicateDetector::detect`] switches to chunks
pub const BATCHED_MIN_PHOTOS: usize = 1000;

/// Seeds per chunk in batched mode
pub const BATCH_CHUNK_SIZE: usize = 100;

/// Groups photos whose fingerprints are within the duplicate threshold
pub struct DuplicateDetector<M> {
    metric: M,
    config: DuplicateConfig,
}

impl<M: FingerprintMetric> DuplicateDetector<M> {
    pub fn new(metric: M, config: DuplicateConfig) -> Self {
        Self { metric, config }
    }

    pub fn config(&self) -> &DuplicateConfig {
        &self.config
    }

    /// Within threshold. A failed distance call is never a duplicate.
    pub fn is_duplicate(&self, a: &FeatureFingerprint, b: &FeatureFingerprint) -> bool {
        match self.metric.distance(a, b) {
            Ok(distance) => distance <= self.config.threshold(),
            Err(e) => {
                debug!(error = %e, "fingerprint distance failed, treating as non-match");
                false
            }
        }
    }

    /// Group photos, choosing the chunked variant for large inputs.
    pub fn detect(&self, photos: &[(PhotoId, FeatureFingerprint)]) -> Vec<Group> {
        if photos.len() >= BATCHED_MIN_PHOTOS {
            self.detect_batched(photos, &null_sender(), &CancellationToken::new())
        } else {
            self.detect_greedy(photos)
        }
    }

    /// Group every record that has a fingerprint; the rest are skipped.
    pub fn detect_records(&self, records: &[PhotoRecord]) -> Vec<Group> {
        let photos: Vec<(&PhotoId, &FeatureFingerprint)> = records
            .iter()
            .filter_map(|r| r.fingerprint.as_ref().map(|fp| (&r.id, fp)))
            .collect();
        self.run(&photos, BATCH_CHUNK_SIZE, &null_sender(), &CancellationToken::new())
    }

    /// Single greedy pass over all photos.
    pub fn detect_greedy(&self, photos: &[(PhotoId, FeatureFingerprint)]) -> Vec<Group> {
        let refs = as_refs(photos);
        self.run(&refs, refs.len().max(1), &null_sender(), &CancellationToken::new())
    }

    /// Greedy pass with seeds taken 100 at a time.
    ///
    /// Each seed still compares against every remaining ungrouped photo,
    /// so the result equals [`detect_greedy`](Self::detect_greedy).
    /// Cancellation is checked between chunks; groups formed before it
    /// are returned.
    pub fn detect_batched(
        &self,
        photos: &[(PhotoId, FeatureFingerprint)],
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Vec<Group> {
        let refs = as_refs(photos);
        self.run(&refs, BATCH_CHUNK_SIZE, events, cancel)
    }

    fn run(
        &self,
        photos: &[(&PhotoId, &FeatureFingerprint)],
        chunk_size: usize,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Vec<Group> {
        let total = photos.len();
        events.send(Event::Grouping(GroupingEvent::Started {
            kind: GroupKind::Duplicate,
            total_photos: total,
        }));

        let mut grouped = vec![false; total];
        let mut groups = Vec::new();

        for chunk_start in (0..total).step_by(chunk_size.max(1)) {
            if cancel.is_cancelled() {
                info!(processed = chunk_start, total, "duplicate detection cancelled");
                break;
            }

            let chunk_end = (chunk_start + chunk_size).min(total);
            for seed in chunk_start..chunk_end {
                if let Some(members) = self.absorb_from(seed, photos, &mut grouped) {
                    let group = Group::new(
                        GroupKind::Duplicate,
                        members.into_iter().map(|i| photos[i].0.clone()),
                    );
                    events.send(Event::Grouping(GroupingEvent::GroupOpened {
                        kind: GroupKind::Duplicate,
                        group_id: group.id.to_string(),
                        photo_count: group.len(),
                    }));
                    groups.push(group);
                }
            }

            events.send(Event::Grouping(GroupingEvent::Progress(GroupingProgress {
                kind: GroupKind::Duplicate,
                processed: chunk_end,
                total,
                groups_found: groups.len(),
            })));
        }

        events.send(Event::Grouping(GroupingEvent::Completed {
            kind: GroupKind::Duplicate,
            total_groups: groups.len(),
        }));
        debug!(photos = total, groups = groups.len(), "duplicate detection finished");

        groups
    }

    /// Seed a group at `seed` and pull in later ungrouped matches.
    ///
    /// Candidates are compared in parallel; only this seed's matches are
    /// marked, so the outcome equals a sequential scan.
    fn absorb_from(
        &self,
        seed: usize,
        photos: &[(&PhotoId, &FeatureFingerprint)],
        grouped: &mut [bool],
    ) -> Option<Vec<usize>> {
        if grouped[seed] {
            return None;
        }

        let seen: &[bool] = grouped;
        let matches: Vec<usize> = ((seed + 1)..photos.len())
            .into_par_iter()
            .filter(|&candidate| {
                !seen[candidate] && self.is_duplicate(photos[seed].1, photos[candidate].1)
            })
            .collect();

        if matches.is_empty() {
            return None;
        }
        grouped[seed] = true;
        let mut members = Vec::with_capacity(matches.len() + 1);
        members.push(seed);
        for candidate in matches {
            grouped[candidate] = true;
            members.push(candidate);
        }
        Some(members)
    }
}

fn as_refs(photos: &[(PhotoId, FeatureFingerprint)]) -> Vec<(&PhotoId, &FeatureFingerprint)> {
    photos.iter().map(|(id, fp)| (id, fp)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::duplicates::EuclideanMetric;
    use crate::error::CompareError;
    use crate::events::EventChannel;

    fn photo(id: &str, values: &[f32]) -> (PhotoId, FeatureFingerprint) {
        (PhotoId::from(id), FeatureFingerprint::new(values.to_vec()))
    }

    fn detector() -> DuplicateDetector<EuclideanMetric> {
        DuplicateDetector::new(EuclideanMetric, DuplicateConfig::default())
    }

    fn member_ids(groups: &[Group]) -> Vec<Vec<&str>> {
        groups
            .iter()
            .map(|g| g.members().iter().map(PhotoId::as_str).collect())
            .collect()
    }

    #[test]
    fn empty_input_returns_no_groups() {
        assert!(detector().detect(&[]).is_empty());
        assert!(detector().detect_records(&[]).is_empty());
    }

    #[test]
    fn close_fingerprints_form_a_group() {
        let photos = vec![
            photo("1", &[0.0, 0.0]),
            photo("2", &[0.3, 0.0]),
            photo("3", &[5.0, 5.0]),
        ];

        let groups = detector().detect(&photos);
        assert_eq!(member_ids(&groups), vec![vec!["1", "2"]]);
        assert!(groups.iter().all(|g| g.kind == GroupKind::Duplicate));
    }

    #[test]
    fn membership_is_measured_against_the_seed() {
        // 2 is close to both, 3 is only close to 2; first come wins
        let photos = vec![
            photo("1", &[0.0]),
            photo("2", &[0.4]),
            photo("3", &[0.8]),
        ];

        let groups = detector().detect(&photos);
        assert_eq!(member_ids(&groups), vec![vec!["1", "2"]]);
    }

    #[test]
    fn failed_distance_is_not_a_duplicate() {
        let metric = |a: &FeatureFingerprint, b: &FeatureFingerprint| -> Result<f32, CompareError> {
            if a.as_slice()[0] == 99.0 || b.as_slice()[0] == 99.0 {
                Err(CompareError::Failed("model crashed".to_string()))
            } else {
                Ok(0.0)
            }
        };
        let detector = DuplicateDetector::new(metric, DuplicateConfig::default());
        let photos = vec![photo("a", &[1.0]), photo("broken", &[99.0]), photo("b", &[2.0])];

        let groups = detector.detect(&photos);
        assert_eq!(member_ids(&groups), vec![vec!["a", "b"]]);
    }

    #[test]
    fn records_without_fingerprints_are_skipped() {
        let records = vec![
            PhotoRecord::new("1", 10, 10, 1).with_fingerprint(FeatureFingerprint::new(vec![0.0])),
            PhotoRecord::new("no-fp", 10, 10, 1),
            PhotoRecord::new("2", 10, 10, 1).with_fingerprint(FeatureFingerprint::new(vec![0.1])),
        ];

        let groups = detector().detect_records(&records);
        assert_eq!(member_ids(&groups), vec![vec!["1", "2"]]);
    }

    #[test]
    fn batched_matches_greedy() {
        // Pairs of near-identical fingerprints spread over several chunks
        let photos: Vec<_> = (0..250)
            .map(|i| {
                let base = (i / 2) as f32 * 10.0;
                photo(&i.to_string(), &[base + (i % 2) as f32 * 0.2])
            })
            .collect();

        let greedy = detector().detect_greedy(&photos);
        let batched = detector().detect_batched(&photos, &null_sender(), &CancellationToken::new());

        assert_eq!(greedy.len(), 125);
        assert_eq!(member_ids(&greedy), member_ids(&batched));
    }

    #[test]
    fn batched_reports_progress_per_chunk() {
        let (sender, receiver) = EventChannel::new();
        let photos: Vec<_> = (0..250).map(|i| photo(&i.to_string(), &[i as f32 * 10.0])).collect();

        detector().detect_batched(&photos, &sender, &CancellationToken::new());
        drop(sender);

        let progress: Vec<usize> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Grouping(GroupingEvent::Progress(p)) => Some(p.processed),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![100, 200, 250]);
    }

    #[test]
    fn cancelled_before_start_returns_nothing() {
        let photos: Vec<_> = (0..10).map(|i| photo(&i.to_string(), &[0.0])).collect();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let groups = detector().detect_batched(&photos, &null_sender(), &cancel);
        assert!(groups.is_empty());
    }

    #[test]
    fn cancelling_during_first_chunk_keeps_its_groups() {
        // 125 pairs; the first chunk of seeds closes pairs 0..50
        let photos: Vec<_> = (0..250)
            .map(|i| {
                let base = (i / 2) as f32 * 10.0;
                photo(&i.to_string(), &[base + (i % 2) as f32 * 0.2])
            })
            .collect();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let metric = move |a: &FeatureFingerprint, b: &FeatureFingerprint| {
            trigger.cancel();
            EuclideanMetric.distance(a, b)
        };
        let (sender, receiver) = EventChannel::new();

        let groups = DuplicateDetector::new(metric, DuplicateConfig::default())
            .detect_batched(&photos, &sender, &cancel);
        drop(sender);

        assert_eq!(groups.len(), 50);
        assert!(groups
            .iter()
            .flat_map(|g| g.members())
            .all(|id| id.as_str().parse::<usize>().unwrap() < 100));

        let progress: Vec<usize> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Grouping(GroupingEvent::Progress(p)) => Some(p.processed),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![100]);
    }
}
