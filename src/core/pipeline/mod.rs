//! # Pipeline Module
//!
//! Drives a full curation scan.
//!
//! ## Scan Stages
//! 1. **Analyse** - external feature extraction per photo, in parallel on
//!    a bounded rayon pool (default 8 workers)
//! 2. **Accumulate** - each analysed photo is folded into the duplicate and
//!    similar groups by a single writer
//! 3. **Filter** - composite quality below the threshold is reported
//! 4. **Rank** - on demand, per finished group
//!
//! Photos move through stages 1 and 2 in batches (default 50). Cancellation
//! is checked between batches; a cancelled scan still returns every group
//! found so far.

mod cancellation;
mod executor;
mod traits;

pub use cancellation::CancellationToken;
pub use executor::{
    ScanBuilder, ScanConfig, ScanResult, ScanSession, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY,
    MAX_CONCURRENCY,
};
pub use traits::{FeatureExtractor, PendingPhoto};
