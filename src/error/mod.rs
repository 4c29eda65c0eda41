//! # Error Module
//!
//! Error types for the photo curation engine.
//!
//! ## Design Principles
//! - **Degrade, don't abort** - per-photo and per-pair failures shrink the
//!   result set, they never invalidate it
//! - **Include context** - photo ids and what went wrong
//! - **Clamp, don't reject** - out-of-range configuration is adjusted, so
//!   there is no engine-level configuration error

use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug)]
pub enum CurationError {
    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Group error: {0}")]
    Group(#[from] GroupError),
}

/// Errors that occur while computing perceptual hashes
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Pixel buffer is malformed: {reason}")]
    InvalidBuffer { reason: String },

    #[error("Resize to {width}x{height} failed: {reason}")]
    ResizeFailed {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// Errors from a pairwise fingerprint distance call
///
/// Callers treat every variant as "not a match".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompareError {
    #[error("Fingerprint dimensions differ ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Fingerprint distance is not a finite number")]
    NonFiniteDistance,

    #[error("Distance computation failed: {0}")]
    Failed(String),
}

/// Errors reported by external feature extraction for a single photo
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Fingerprint extraction failed for {id}: {reason}")]
    Fingerprint { id: String, reason: String },

    #[error("Embedding computation failed for {id}: {reason}")]
    Embedding { id: String, reason: String },

    #[error("Quality assessment failed for {id}: {reason}")]
    Quality { id: String, reason: String },

    #[error("Hashing failed for {id}: {reason}")]
    Hash { id: String, reason: String },
}

impl AnalysisError {
    /// Id of the photo whose analysis failed
    pub fn photo_id(&self) -> &str {
        match self {
            AnalysisError::Fingerprint { id, .. }
            | AnalysisError::Embedding { id, .. }
            | AnalysisError::Quality { id, .. }
            | AnalysisError::Hash { id, .. } => id,
        }
    }
}

/// Errors from the scan driver and the accumulator actor
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan was cancelled")]
    Cancelled,

    #[error("Accumulator worker is no longer running")]
    WorkerStopped,

    #[error("Failed to build analysis worker pool: {0}")]
    WorkerPool(String),
}

/// Errors reading CLI input (records files, images)
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse photo records in {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// A stored group that breaks the group invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupError {
    #[error("Group needs at least two distinct members, found {count}")]
    TooFewMembers { count: usize },

    #[error("Selected photo {id} is not a member of the group")]
    SelectionNotMember { id: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, CurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_error_includes_photo_id() {
        let error = AnalysisError::Embedding {
            id: "IMG_0042".to_string(),
            reason: "model unavailable".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("IMG_0042"));
        assert!(message.contains("model unavailable"));
        assert_eq!(error.photo_id(), "IMG_0042");
    }

    #[test]
    fn compare_error_reports_dimensions() {
        let error = CompareError::DimensionMismatch { left: 128, right: 64 };
        let message = error.to_string();
        assert!(message.contains("128"));
        assert!(message.contains("64"));
    }

    #[test]
    fn errors_convert_into_top_level() {
        let error: CurationError = ScanError::Cancelled.into();
        assert!(error.to_string().contains("cancelled"));
    }
}
