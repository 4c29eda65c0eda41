//! Streaming duplicate and similarity grouping.

use crate::core::duplicates::{merge_overlapping_groups, DuplicateDetector, FingerprintMetric};
use crate::core::hasher::PerceptualHash;
use crate::core::model::{EmbeddingVector, FeatureFingerprint, Group, GroupKind, PhotoId, PhotoRecord};
use crate::core::similar::SimilarityGrouper;
use crate::events::{null_sender, Event, EventSender, GroupingEvent};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Groups found by an accumulator, open or finished
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccumulatorResult {
    pub duplicate_groups: Vec<Group>,
    pub similar_groups: Vec<Group>,
    /// Distinct photos handed to [`IncrementalScanAccumulator::add`]
    pub photos_added: usize,
}

impl AccumulatorResult {
    pub fn total_groups(&self) -> usize {
        self.duplicate_groups.len() + self.similar_groups.len()
    }
}

/// Open groups of one kind, with a reverse index from photo to group.
///
/// Merged-away groups leave an empty slot behind so indices stay stable.
#[derive(Debug)]
struct OpenGroups {
    kind: GroupKind,
    slots: Vec<Option<Group>>,
    index: HashMap<PhotoId, usize>,
}

/// What [`OpenGroups::link`] did
enum Linked {
    Opened(usize),
    Joined,
}

impl OpenGroups {
    fn new(kind: GroupKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Put `photo` in a group with every one of `matches`.
    ///
    /// The target is the group of the first match that already has one,
    /// otherwise a new group seeded with the first match. Any other group
    /// reached through `matches` is merged into the target.
    fn link(&mut self, photo: &PhotoId, matches: &[PhotoId]) -> Option<Linked> {
        let first = matches.first()?;

        let (target, linked) = match matches.iter().find_map(|m| self.index.get(m).copied()) {
            Some(slot) => (slot, Linked::Joined),
            None => {
                let slot = self.slots.len();
                self.slots.push(Some(Group::seed(self.kind, first.clone(), photo.clone())));
                self.index.insert(first.clone(), slot);
                self.index.insert(photo.clone(), slot);
                (slot, Linked::Opened(slot))
            }
        };

        for id in std::iter::once(photo).chain(matches) {
            self.attach(target, id);
        }
        Some(linked)
    }

    fn attach(&mut self, target: usize, id: &PhotoId) {
        match self.index.get(id).copied() {
            Some(slot) if slot == target => {}
            Some(slot) => {
                let Some(other) = self.slots[slot].take() else {
                    return;
                };
                trace!(kind = %self.kind, from = slot, into = target, "merging overlapping groups");
                for member in other.members() {
                    self.index.insert(member.clone(), target);
                }
                if let Some(group) = self.slots[target].as_mut() {
                    group.absorb(other);
                }
            }
            None => {
                if let Some(group) = self.slots[target].as_mut() {
                    group.push(id.clone());
                    self.index.insert(id.clone(), target);
                }
            }
        }
    }

    fn get(&self, slot: usize) -> Option<&Group> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    fn snapshot(&self) -> Vec<Group> {
        self.slots
            .iter()
            .flatten()
            .filter(|g| g.is_exposable())
            .cloned()
            .collect()
    }

    fn into_groups(self) -> Vec<Group> {
        self.slots
            .into_iter()
            .flatten()
            .filter(Group::is_exposable)
            .collect()
    }
}

/// Seen-so-far grouping for a long-running scan.
///
/// Each arrival is compared against every photo seen before it: by
/// fingerprint for duplicates, by hash (and embedding where both sides
/// have one) for similarity. Groups touched by one arrival are merged on
/// the spot, so the finished partition is the connected components of the
/// match graph whatever the arrival order.
///
/// Owns all group state; drive it from a single thread or through
/// [`AccumulatorHandle`](super::AccumulatorHandle).
pub struct IncrementalScanAccumulator<M> {
    detector: DuplicateDetector<M>,
    grouper: SimilarityGrouper,
    seen_ids: HashSet<PhotoId>,
    seen_fingerprints: Vec<(PhotoId, FeatureFingerprint)>,
    seen_hashes: Vec<(PhotoId, PerceptualHash, Option<EmbeddingVector>)>,
    duplicates: OpenGroups,
    similar: OpenGroups,
    events: EventSender,
}

impl<M: FingerprintMetric> IncrementalScanAccumulator<M> {
    pub fn new(detector: DuplicateDetector<M>, grouper: SimilarityGrouper) -> Self {
        Self {
            detector,
            grouper,
            seen_ids: HashSet::new(),
            seen_fingerprints: Vec::new(),
            seen_hashes: Vec::new(),
            duplicates: OpenGroups::new(GroupKind::Duplicate),
            similar: OpenGroups::new(GroupKind::Similar),
            events: null_sender(),
        }
    }

    /// Report newly opened groups on `events`
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Fold one analysed photo into the groups.
    ///
    /// Whatever is missing from the record (fingerprint, hash) just means
    /// fewer comparisons. A photo id seen before is ignored.
    pub fn add(&mut self, photo: &PhotoRecord) {
        if !self.seen_ids.insert(photo.id.clone()) {
            debug!(photo = %photo.id, "photo already accumulated, skipping");
            return;
        }

        if let Some(fingerprint) = &photo.fingerprint {
            let matches: Vec<PhotoId> = self
                .seen_fingerprints
                .iter()
                .filter(|(_, seen)| self.detector.is_duplicate(fingerprint, seen))
                .map(|(id, _)| id.clone())
                .collect();
            let linked = self.duplicates.link(&photo.id, &matches);
            self.report(GroupKind::Duplicate, linked);
            self.seen_fingerprints.push((photo.id.clone(), fingerprint.clone()));
        }

        if let Some(hash) = photo.hash {
            let embedding = photo.embedding.as_ref();
            let matches: Vec<PhotoId> = self
                .seen_hashes
                .iter()
                .filter(|(_, seen_hash, seen_embedding)| {
                    self.grouper
                        .is_similar((hash, embedding), (*seen_hash, seen_embedding.as_ref()))
                })
                .map(|(id, _, _)| id.clone())
                .collect();
            let linked = self.similar.link(&photo.id, &matches);
            self.report(GroupKind::Similar, linked);
            self.seen_hashes.push((photo.id.clone(), hash, photo.embedding.clone()));
        }
    }

    pub fn add_batch(&mut self, photos: &[PhotoRecord]) {
        for photo in photos {
            self.add(photo);
        }
    }

    fn report(&self, kind: GroupKind, linked: Option<Linked>) {
        let Some(Linked::Opened(slot)) = linked else {
            return;
        };
        let groups = match kind {
            GroupKind::Duplicate => &self.duplicates,
            GroupKind::Similar => &self.similar,
        };
        if let Some(group) = groups.get(slot) {
            self.events.send(Event::Grouping(GroupingEvent::GroupOpened {
                kind,
                group_id: group.id.to_string(),
                photo_count: group.len(),
            }));
        }
    }

    pub fn photos_added(&self) -> usize {
        self.seen_ids.len()
    }

    /// Open groups with at least two members, without consuming the accumulator
    pub fn snapshot(&self) -> AccumulatorResult {
        AccumulatorResult {
            duplicate_groups: self.duplicates.snapshot(),
            similar_groups: self.similar.snapshot(),
            photos_added: self.photos_added(),
        }
    }

    /// Close every group. Partial scans return what they have so far.
    pub fn finish(self) -> AccumulatorResult {
        let photos_added = self.photos_added();
        debug!(
            photos = photos_added,
            duplicate_groups = self.duplicates.len(),
            similar_groups = self.similar.len(),
            "closing accumulator"
        );

        let duplicate_groups = merge_overlapping_groups(self.duplicates.into_groups());
        let similar_groups = merge_overlapping_groups(self.similar.into_groups());
        for (kind, total_groups) in [
            (GroupKind::Duplicate, duplicate_groups.len()),
            (GroupKind::Similar, similar_groups.len()),
        ] {
            self.events
                .send(Event::Grouping(GroupingEvent::Completed { kind, total_groups }));
        }

        AccumulatorResult {
            duplicate_groups,
            similar_groups,
            photos_added,
        }
    }
}
