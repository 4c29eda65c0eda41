//! # Model Module
//!
//! Photo records and the groups they are collected into.
//!
//! Every analysis product on a [`PhotoRecord`] is optional: a photo whose
//! fingerprint extraction failed still takes part in hash similarity, and
//! vice versa. Records are never merged, only listed together in a
//! [`Group`].

use crate::core::hasher::PerceptualHash;
use crate::core::quality::QualityScore;
use crate::error::GroupError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a photo in the host library
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PhotoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PhotoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width over height, `None` for a zero height
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0).then(|| self.width as f64 / self.height as f64)
    }
}

/// High-fidelity feature descriptor produced by an external vision model.
///
/// Opaque to the engine: only a
/// [`FingerprintMetric`](crate::core::duplicates::FingerprintMetric) looks
/// inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureFingerprint(Vec<f32>);

impl FeatureFingerprint {
    pub fn new(data: Vec<f32>) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Dense semantic embedding, compared by cosine similarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        crate::core::similar::cosine_similarity(&self.0, &other.0)
    }
}

/// Everything known about one photo after (possibly partial) analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: PhotoId,
    pub dimensions: Dimensions,
    pub file_size_bytes: u64,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub quality: Option<QualityScore>,
    #[serde(default)]
    pub hash: Option<PerceptualHash>,
    #[serde(default)]
    pub fingerprint: Option<FeatureFingerprint>,
    #[serde(default)]
    pub embedding: Option<EmbeddingVector>,
}

impl PhotoRecord {
    pub fn new(id: impl Into<PhotoId>, width: u32, height: u32, file_size_bytes: u64) -> Self {
        Self {
            id: id.into(),
            dimensions: Dimensions::new(width, height),
            file_size_bytes,
            creation_date: None,
            quality: None,
            hash: None,
            fingerprint: None,
            embedding: None,
        }
    }

    pub fn with_creation_date(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(date);
        self
    }

    pub fn with_quality(mut self, quality: QualityScore) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_hash(mut self, hash: PerceptualHash) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: FeatureFingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn with_embedding(mut self, embedding: EmbeddingVector) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// What a group's members have in common
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// Fingerprints within the duplicate threshold
    Duplicate,
    /// Perceptual hashes (and optionally embeddings) close enough
    Similar,
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKind::Duplicate => write!(f, "Duplicate"),
            GroupKind::Similar => write!(f, "Similar"),
        }
    }
}

/// A set of photo ids considered duplicate or similar.
///
/// Members are unique and keep insertion order. Groups grow by append and
/// never shrink on their own. Deserialized groups are checked: repeated
/// ids are dropped, fewer than two members or a selection outside the
/// group is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGroup")]
pub struct Group {
    pub id: Uuid,
    pub kind: GroupKind,
    members: Vec<PhotoId>,
    /// Keeper chosen by the ranker or the user
    pub selected_id: Option<PhotoId>,
}

impl Group {
    /// Build a group; repeated ids are dropped
    pub fn new(kind: GroupKind, members: impl IntoIterator<Item = PhotoId>) -> Self {
        let mut group = Self {
            id: Uuid::new_v4(),
            kind,
            members: Vec::new(),
            selected_id: None,
        };
        for member in members {
            group.push(member);
        }
        group
    }

    /// Two-member group created on a first match
    pub fn seed(kind: GroupKind, first: PhotoId, second: PhotoId) -> Self {
        Self::new(kind, [first, second])
    }

    pub fn members(&self) -> &[PhotoId] {
        &self.members
    }

    pub fn into_members(self) -> Vec<PhotoId> {
        self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &PhotoId) -> bool {
        self.members.contains(id)
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn push(&mut self, id: PhotoId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.members.push(id);
        true
    }

    /// Append every member of `other` not already present
    pub fn absorb(&mut self, other: Group) {
        for id in other.members {
            self.push(id);
        }
    }

    /// Groups under two members are never exposed
    pub fn is_exposable(&self) -> bool {
        self.members.len() >= 2
    }

    /// Copy of this group with `selected_id` set
    pub fn with_selection(mut self, selected: PhotoId) -> Self {
        self.selected_id = Some(selected);
        self
    }
}

#[derive(Deserialize)]
struct RawGroup {
    id: Uuid,
    kind: GroupKind,
    members: Vec<PhotoId>,
    #[serde(default)]
    selected_id: Option<PhotoId>,
}

impl TryFrom<RawGroup> for Group {
    type Error = GroupError;

    fn try_from(raw: RawGroup) -> Result<Self, Self::Error> {
        let mut group = Group::new(raw.kind, raw.members);
        group.id = raw.id;

        if !group.is_exposable() {
            return Err(GroupError::TooFewMembers { count: group.len() });
        }
        if let Some(selected) = raw.selected_id {
            if !group.contains(&selected) {
                return Err(GroupError::SelectionNotMember {
                    id: selected.as_str().to_string(),
                });
            }
            group.selected_id = Some(selected);
        }
        Ok(group)
    }
}
