//! # Incremental Module
//!
//! Grouping while a scan is still running.
//!
//! - [`IncrementalScanAccumulator`] - compares each arrival with everything
//!   seen so far and keeps duplicate and similar groups up to date
//! - [`AccumulatorHandle`] - runs one accumulator on its own thread and
//!   accepts photos from any number of producers over a channel
//!
//! The accumulator compares against photos seen so far only, so its
//! groups can differ from the batch detectors in [`crate::core::duplicates`]
//! and [`crate::core::similar`], which measure against a seed.

mod accumulator;
mod actor;

pub use accumulator::{AccumulatorResult, IncrementalScanAccumulator};
pub use actor::{AccumulatorHandle, PhotoSubmitter};
