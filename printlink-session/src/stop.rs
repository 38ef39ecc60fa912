//! Cooperative stop signal for the receive loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owned cancellation token
///
/// The session keeps one clone and moves another into the receive loop.
/// Stopping is a request: the loop sees it at the top of its next
/// iteration.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop. Idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}
