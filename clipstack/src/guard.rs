//! Feedback guard: keeps the capture path from recording the engine's own
//! clipboard writes.
//!
//! Every engine-initiated write runs while holding a `Suppression` token. The
//! token releases the gate in `Drop`, so an error returned with `?` or a panic
//! unwinding out of the injector can't leave capture switched off.
//!
//! Any clipboard change that lands inside a guarded window is dropped, even one
//! made by another application. The gate can't tell them apart.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

/// Shared suppression gate. Counted, so overlapping windows (two paste-backs
/// racing) keep the gate closed until the last one ends.
#[derive(Debug, Default)]
pub struct FeedbackGuard {
    depth: AtomicUsize,
}

impl FeedbackGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suppressed(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }

    /// Close the gate until the returned token is dropped
    pub fn suppress(&self) -> Suppression<'_> {
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(depth, "capture suppressed");
        Suppression { guard: self }
    }
}

/// RAII token returned by [`FeedbackGuard::suppress`]
#[must_use = "capture is only suppressed while the token is alive"]
pub struct Suppression<'a> {
    guard: &'a FeedbackGuard,
}

impl Drop for Suppression<'_> {
    fn drop(&mut self) {
        let depth = self.guard.depth.fetch_sub(1, Ordering::SeqCst) - 1;
        trace!(depth, "capture suppression released");
    }
}
