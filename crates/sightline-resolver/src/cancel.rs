//! Caller-driven cancellation.
//!
//! `resolve` holds no long-lived state, so cancellation only needs a flag
//! the traversal loops can poll. Callers that want a timeout arm a timer
//! thread (or their runtime's equivalent) that flips the token; the
//! in-flight call then fails closed with `ResolveError::Cancelled`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cheap clonable cancellation handle.
///
/// All clones share one flag; cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
