//! Event type definitions for progress reporting.

use crate::core::model::GroupKind;
use serde::{Deserialize, Serialize};

/// All events emitted while curating a library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// External feature extraction per photo
    Analysis(AnalysisEvent),
    /// Duplicate / similarity grouping
    Grouping(GroupingEvent),
    /// Scan-level events
    Pipeline(PipelineEvent),
}

/// Events during per-photo analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnalysisEvent {
    /// Progress after each batch
    Progress(AnalysisProgress),
    /// One analysis step failed; the photo is kept with what succeeded
    PhotoDegraded { photo_id: String, message: String },
}

/// Progress information during analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisProgress {
    /// Photos handed to the accumulator so far
    pub completed: usize,
    /// Photos in the scan
    pub total: usize,
    /// Photos with at least one failed analysis step
    pub degraded: usize,
}

/// Events during grouping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroupingEvent {
    /// Grouping has started
    Started { kind: GroupKind, total_photos: usize },
    /// Progress update, typically per chunk of seeds
    Progress(GroupingProgress),
    /// A new group was opened
    GroupOpened {
        kind: GroupKind,
        group_id: String,
        photo_count: usize,
    },
    /// Grouping completed
    Completed { kind: GroupKind, total_groups: usize },
}

/// Progress information during grouping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingProgress {
    pub kind: GroupKind,
    /// Photos processed as seeds or arrivals
    pub processed: usize,
    pub total: usize,
    /// Groups found so far
    pub groups_found: usize,
}

/// Scan-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Scan has started
    Started { total_photos: usize },
    /// One batch went through analysis and accumulation
    BatchCompleted { batch_index: usize, batch_size: usize },
    /// Scan finished every batch
    Completed { summary: ScanSummary },
    /// Scan stopped at a batch boundary; groups found so far are kept
    Cancelled { summary: ScanSummary },
}

/// Summary of a scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Photos handed to the accumulator
    pub photos_analyzed: usize,
    /// Photos with at least one failed analysis step
    pub photos_degraded: usize,
    pub duplicate_groups: usize,
    pub similar_groups: usize,
    pub low_quality_photos: usize,
    pub duration_ms: u64,
}
