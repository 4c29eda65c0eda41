//! Cooperative cancellation shared between a scan and its caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag checked at batch boundaries. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Work in flight finishes its current batch.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can drive another scan
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}
