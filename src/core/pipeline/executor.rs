//! Scan driver: parallel analysis, sequential accumulation.

use super::traits::{analyze, FeatureExtractor, PendingPhoto};
use super::CancellationToken;
use crate::core::duplicates::{DuplicateConfig, DuplicateDetector, FingerprintMetric};
use crate::core::incremental::IncrementalScanAccumulator;
use crate::core::model::{Group, PhotoId, PhotoRecord};
use crate::core::quality::{low_quality_ids, DEFAULT_LOW_QUALITY_THRESHOLD};
use crate::core::ranker::{BestPhotoRanker, GroupRanking};
use crate::core::similar::{SimilarConfig, SimilarityGrouper};
use crate::error::{AnalysisError, ScanError};
use crate::events::{
    null_sender, AnalysisEvent, AnalysisProgress, Event, EventSender, PipelineEvent, ScanSummary,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default number of analysis workers
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Upper bound on analysis workers
pub const MAX_CONCURRENCY: usize = 16;

/// Default photos per batch
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Result of a scan, complete or cancelled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Every photo that reached the accumulator, with the features it got
    pub records: Vec<PhotoRecord>,
    pub duplicate_groups: Vec<Group>,
    pub similar_groups: Vec<Group>,
    pub low_quality_ids: Vec<PhotoId>,
    pub summary: ScanSummary,
    /// Stopped at a batch boundary before the last batch
    pub cancelled: bool,
}

impl ScanResult {
    /// Rank every group, returning each with its keeper selected
    pub fn ranked_groups(&self, ranker: &BestPhotoRanker) -> Vec<(Group, GroupRanking)> {
        self.duplicate_groups
            .iter()
            .chain(&self.similar_groups)
            .filter_map(|group| {
                let ranking = ranker.rank_group(group, &self.records)?;
                Some((group.clone().with_selection(ranking.keeper_id.clone()), ranking))
            })
            .collect()
    }

    /// `Err(ScanError::Cancelled)` for a partial result
    pub fn into_complete(self) -> Result<Self, ScanError> {
        if self.cancelled {
            Err(ScanError::Cancelled)
        } else {
            Ok(self)
        }
    }
}

/// Configuration for a scan.
///
/// Deserialized values go through the same clamping as [`ScanBuilder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawScanConfig")]
pub struct ScanConfig {
    /// Analysis worker threads, `[1, 16]`
    pub concurrency: usize,
    /// Photos per batch, at least 1
    pub batch_size: usize,
    /// Composite score below which a photo is reported, `[0, 1]`
    pub low_quality_threshold: f64,
    pub duplicates: DuplicateConfig,
    pub similar: SimilarConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            low_quality_threshold: DEFAULT_LOW_QUALITY_THRESHOLD,
            duplicates: DuplicateConfig::default(),
            similar: SimilarConfig::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawScanConfig {
    concurrency: usize,
    batch_size: usize,
    low_quality_threshold: f64,
    duplicates: DuplicateConfig,
    similar: SimilarConfig,
}

impl Default for RawScanConfig {
    fn default() -> Self {
        let defaults = ScanConfig::default();
        Self {
            concurrency: defaults.concurrency,
            batch_size: defaults.batch_size,
            low_quality_threshold: defaults.low_quality_threshold,
            duplicates: defaults.duplicates,
            similar: defaults.similar,
        }
    }
}

impl From<RawScanConfig> for ScanConfig {
    fn from(raw: RawScanConfig) -> Self {
        let mut builder = ScanBuilder::new()
            .concurrency(raw.concurrency)
            .batch_size(raw.batch_size)
            .low_quality_threshold(raw.low_quality_threshold)
            .similar(raw.similar);
        builder.config.duplicates = raw.duplicates;
        builder.config
    }
}

/// Builder for scan sessions
#[derive(Default)]
pub struct ScanBuilder {
    config: ScanConfig,
}

impl ScanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of analysis workers (clamped to `[1, 16]`)
    pub fn concurrency(mut self, workers: usize) -> Self {
        let clamped = workers.clamp(1, MAX_CONCURRENCY);
        if clamped != workers {
            debug!(requested = workers, clamped, "concurrency clamped");
        }
        self.config.concurrency = clamped;
        self
    }

    /// Set photos per batch (at least 1)
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size.max(1);
        self
    }

    /// Set the low-quality threshold (clamped to `[0, 1]`)
    pub fn low_quality_threshold(mut self, threshold: f64) -> Self {
        self.config.low_quality_threshold = if threshold.is_nan() {
            DEFAULT_LOW_QUALITY_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        self
    }

    pub fn duplicate_threshold(mut self, threshold: f32) -> Self {
        self.config.duplicates = DuplicateConfig::new(threshold);
        self
    }

    pub fn similar(mut self, config: SimilarConfig) -> Self {
        self.config.similar = config;
        self
    }

    pub fn build(self) -> ScanSession {
        ScanSession {
            config: self.config,
        }
    }
}

/// Drives one scan from analysis to finished groups
pub struct ScanSession {
    config: ScanConfig,
}

type Analyzed = (PhotoRecord, Vec<AnalysisError>);

impl ScanSession {
    pub fn builder() -> ScanBuilder {
        ScanBuilder::new()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Analyse `photos` on a worker pool and group them as batches finish.
    ///
    /// Analysis of a batch runs in parallel; the results are then fed to a
    /// single accumulator in input order. Cancellation is checked before
    /// each batch.
    pub fn run<P, E, M>(
        &self,
        photos: &[PendingPhoto<P>],
        extractor: &E,
        metric: M,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<ScanResult, ScanError>
    where
        P: Sync,
        E: FeatureExtractor<P>,
        M: FingerprintMetric,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.concurrency)
            .thread_name(|i| format!("photo-analysis-{i}"))
            .build()
            .map_err(|e| ScanError::WorkerPool(e.to_string()))?;

        let batches = photos.chunks(self.config.batch_size).map(|batch| {
            pool.install(|| {
                batch
                    .par_iter()
                    .map(|photo| analyze(extractor, photo))
                    .collect::<Vec<Analyzed>>()
            })
        });

        Ok(self.drive(photos.len(), batches, metric, events, cancel))
    }

    /// Group photos whose features were extracted elsewhere
    pub fn run_records<M: FingerprintMetric>(
        &self,
        records: &[PhotoRecord],
        metric: M,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> ScanResult {
        let batches = records
            .chunks(self.config.batch_size)
            .map(|batch| batch.iter().map(|r| (r.clone(), Vec::new())).collect());
        self.drive(records.len(), batches, metric, events, cancel)
    }

    /// [`run_records`](Self::run_records) without events or cancellation
    pub fn group_records<M: FingerprintMetric>(&self, records: &[PhotoRecord], metric: M) -> ScanResult {
        self.run_records(records, metric, &null_sender(), &CancellationToken::new())
    }

    fn drive<M, I>(
        &self,
        total: usize,
        mut batches: I,
        metric: M,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> ScanResult
    where
        M: FingerprintMetric,
        I: Iterator<Item = Vec<Analyzed>>,
    {
        let start_time = Instant::now();
        info!(total, batch_size = self.config.batch_size, "scan started");
        events.send(Event::Pipeline(PipelineEvent::Started {
            total_photos: total,
        }));

        let mut accumulator = IncrementalScanAccumulator::new(
            DuplicateDetector::new(metric, self.config.duplicates),
            SimilarityGrouper::new(self.config.similar),
        )
        .with_events(events.clone());

        let mut records = Vec::with_capacity(total);
        let mut degraded = 0;
        let mut cancelled = false;

        for batch_index in 0.. {
            if cancel.is_cancelled() {
                info!(completed = records.len(), total, "scan cancelled");
                cancelled = true;
                break;
            }
            let Some(batch) = batches.next() else {
                break;
            };

            let batch_size = batch.len();
            for (record, failures) in batch {
                if !failures.is_empty() {
                    degraded += 1;
                    for failure in failures {
                        warn!(photo = %record.id, error = %failure, "analysis step failed");
                        events.send(Event::Analysis(AnalysisEvent::PhotoDegraded {
                            photo_id: record.id.to_string(),
                            message: failure.to_string(),
                        }));
                    }
                }
                accumulator.add(&record);
                records.push(record);
            }

            events.send(Event::Analysis(AnalysisEvent::Progress(AnalysisProgress {
                completed: records.len(),
                total,
                degraded,
            })));
            events.send(Event::Pipeline(PipelineEvent::BatchCompleted {
                batch_index,
                batch_size,
            }));
        }

        let groups = accumulator.finish();
        let low_quality = low_quality_ids(&records, self.config.low_quality_threshold);

        let summary = ScanSummary {
            photos_analyzed: records.len(),
            photos_degraded: degraded,
            duplicate_groups: groups.duplicate_groups.len(),
            similar_groups: groups.similar_groups.len(),
            low_quality_photos: low_quality.len(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        };
        info!(
            photos = summary.photos_analyzed,
            degraded = summary.photos_degraded,
            duplicate_groups = summary.duplicate_groups,
            similar_groups = summary.similar_groups,
            "scan finished"
        );

        let event = if cancelled {
            PipelineEvent::Cancelled {
                summary: summary.clone(),
            }
        } else {
            PipelineEvent::Completed {
                summary: summary.clone(),
            }
        };
        events.send(Event::Pipeline(event));

        ScanResult {
            records,
            duplicate_groups: groups.duplicate_groups,
            similar_groups: groups.similar_groups,
            low_quality_ids: low_quality,
            summary,
            cancelled,
        }
    }
}
