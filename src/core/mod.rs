//! # Core Module
//!
//! The UI-agnostic curation engine.
//!
//! ## Modules
//! - `hasher` - Computes perceptual hashes from pixels
//! - `cluster` - Generic union-find, DBSCAN and hierarchical clustering
//! - `model` - Photo records and groups
//! - `duplicates` - Groups near-duplicates by fingerprint distance
//! - `similar` - Groups visually similar photos by hash and embedding
//! - `quality` - Composite quality score and grade
//! - `ranker` - Picks the photo to keep in a group
//! - `incremental` - Keeps groups up to date while a scan runs
//! - `pipeline` - Orchestrates analysis, grouping and filtering

pub mod cluster;
pub mod duplicates;
pub mod hasher;
pub mod incremental;
pub mod model;
pub mod pipeline;
pub mod quality;
pub mod ranker;
pub mod similar;

// Re-export commonly used types
pub use duplicates::{DuplicateConfig, DuplicateDetector, EuclideanMetric, FingerprintMetric};
pub use hasher::{HashAlgorithmKind, PerceptualHash};
pub use incremental::{AccumulatorHandle, IncrementalScanAccumulator};
pub use model::{EmbeddingVector, FeatureFingerprint, Group, GroupKind, PhotoId, PhotoRecord};
pub use pipeline::{CancellationToken, ScanResult, ScanSession};
pub use quality::{QualityGrade, QualityScore};
pub use ranker::{BestPhotoRanker, GroupRanking, RankingPreset, RankingWeights};
pub use similar::{SimilarConfig, SimilarityGrouper};
