//! # Photo Curation Engine
//!
//! Finds duplicate and similar photos in a library and recommends which
//! one to keep.
//!
//! ## Core Philosophy
//! - **Never auto-delete** - the engine recommends, the user decides
//! - **Degrade, don't abort** - a photo that fails analysis just takes
//!   part in fewer comparisons
//! - **Explain** - every keeper comes with the reasons it won
//!
//! ## Architecture
//! - `core` - Hashing, clustering, grouping, quality and ranking
//! - `events` - Event-driven progress reporting (UI-ready)
//! - `error` - Error types
//!
//! Fingerprints, embeddings and quality sub-scores come from external
//! vision models through [`core::pipeline::FeatureExtractor`].

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{CurationError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG`
/// controls the filter. A second call leaves the first subscriber in place.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
