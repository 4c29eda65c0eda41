//! Similarity grouping over perceptual hashes, optionally confirmed by
//! embeddings.

use super::types::{MatchType, SimilarConfig, SimilaritySummary};
use crate::core::cluster::{Dbscan, HierarchicalClustering, Linkage};
use crate::core::hasher::PerceptualHash;
use crate::core::model::{EmbeddingVector, Group, GroupKind, PhotoId, PhotoRecord};
use std::collections::HashMap;
use tracing::debug;

/// One photo as seen by the grouper
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    id: &'a PhotoId,
    hash: PerceptualHash,
    embedding: Option<&'a EmbeddingVector>,
}

/// Groups visually similar photos
#[derive(Debug, Clone, Default)]
pub struct SimilarityGrouper {
    config: SimilarConfig,
}

impl SimilarityGrouper {
    pub fn new(config: SimilarConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimilarConfig {
        &self.config
    }

    /// Hash prefilter, then embedding confirmation when both sides have one.
    ///
    /// A missing embedding on either side fails open: the hash match alone
    /// is accepted.
    pub fn is_similar(
        &self,
        a: (PerceptualHash, Option<&EmbeddingVector>),
        b: (PerceptualHash, Option<&EmbeddingVector>),
    ) -> bool {
        if a.0.distance(&b.0) > self.config.hash_threshold() {
            return false;
        }
        if !self.config.uses_embeddings() {
            return true;
        }
        match (a.1, b.1) {
            (Some(ea), Some(eb)) => ea.cosine_similarity(eb) >= self.config.embedding_threshold(),
            _ => true,
        }
    }

    /// Greedy pass on hashes alone.
    pub fn group(&self, photos: &[(PhotoId, PerceptualHash)]) -> Vec<Group> {
        let candidates: Vec<Candidate> = photos
            .iter()
            .map(|(id, hash)| Candidate {
                id,
                hash: *hash,
                embedding: None,
            })
            .collect();
        self.greedy(&candidates)
    }

    /// Two-stage greedy pass over every record that has a hash.
    pub fn group_records(&self, records: &[PhotoRecord]) -> Vec<Group> {
        let candidates: Vec<Candidate> = records
            .iter()
            .filter_map(|r| {
                r.hash.map(|hash| Candidate {
                    id: &r.id,
                    hash,
                    embedding: r.embedding.as_ref(),
                })
            })
            .collect();
        self.greedy(&candidates)
    }

    /// DBSCAN over Hamming distance with `epsilon = hash threshold`.
    ///
    /// Largest groups first.
    pub fn group_dbscan(&self, photos: &[(PhotoId, PerceptualHash)]) -> Vec<Group> {
        let dbscan = Dbscan::new(self.config.hash_threshold() as f64, self.config.min_points());
        dbscan
            .fit(photos, |a, b| a.1.distance(&b.1) as f64)
            .into_iter()
            .map(|cluster| {
                Group::new(
                    GroupKind::Similar,
                    cluster.members.into_iter().map(|(id, _)| id),
                )
            })
            .filter(Group::is_exposable)
            .collect()
    }

    /// Agglomerative clustering over Hamming distance.
    ///
    /// With [`Linkage::Complete`] every pair inside a group is within the
    /// hash threshold, which the greedy pass does not guarantee.
    pub fn group_hierarchical(
        &self,
        photos: &[(PhotoId, PerceptualHash)],
        linkage: Linkage,
    ) -> Vec<Group> {
        HierarchicalClustering::new(linkage, self.config.hash_threshold() as f64)
            .fit(photos, |a, b| a.1.distance(&b.1) as f64)
            .into_iter()
            .map(|cluster| {
                Group::new(
                    GroupKind::Similar,
                    cluster.members.into_iter().map(|(id, _)| id),
                )
            })
            .collect()
    }

    fn greedy(&self, photos: &[Candidate]) -> Vec<Group> {
        let mut grouped = vec![false; photos.len()];
        let mut groups = Vec::new();

        for seed in 0..photos.len() {
            if grouped[seed] {
                continue;
            }
            let anchor = (photos[seed].hash, photos[seed].embedding);

            let mut members = vec![photos[seed].id.clone()];
            for candidate in (seed + 1)..photos.len() {
                let other = (photos[candidate].hash, photos[candidate].embedding);
                if !grouped[candidate] && self.is_similar(anchor, other) {
                    grouped[candidate] = true;
                    members.push(photos[candidate].id.clone());
                }
            }

            if members.len() >= 2 {
                grouped[seed] = true;
                groups.push(Group::new(GroupKind::Similar, members));
            }
        }

        debug!(photos = photos.len(), groups = groups.len(), "similarity grouping finished");
        groups
    }
}

/// Summarise a group against its first member.
///
/// Members without a known hash are ignored; `None` when fewer than two
/// members have one.
pub fn similarity_summary(
    group: &Group,
    hashes: &HashMap<PhotoId, PerceptualHash>,
) -> Option<SimilaritySummary> {
    let mut hashed = group
        .members()
        .iter()
        .filter_map(|id| hashes.get(id).map(|hash| (id, *hash)));

    let (reference, reference_hash) = hashed.next()?;
    let distances: Vec<u32> = hashed.map(|(_, hash)| reference_hash.distance(&hash)).collect();
    let weakest = distances.iter().copied().max()?;

    let average_similarity = distances
        .iter()
        .map(|&d| 1.0 - d as f64 / crate::core::hasher::HASH_BITS as f64)
        .sum::<f64>()
        / distances.len() as f64;

    Some(SimilaritySummary {
        reference: reference.clone(),
        average_similarity,
        weakest_match: MatchType::from_distance(weakest),
    })
}
