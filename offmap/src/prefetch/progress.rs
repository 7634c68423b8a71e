//! Progress events emitted while a route is being prefetched.

use tokio::sync::mpsc;

/// Snapshot of one family's prefetch after a sample point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchProgress {
    /// Family name, e.g. "roads".
    pub family: &'static str,
    /// Sample points processed so far.
    pub current: usize,
    /// Total sample points.
    pub total: usize,
    /// Distinct records cached for the route so far.
    pub found: usize,
    /// Set only on the final event of a run that was not cancelled.
    pub complete: bool,
}

impl PrefetchProgress {
    /// Fraction of sample points processed, 1.0 for an empty run.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Sending half of a progress channel.
pub type ProgressSender = mpsc::UnboundedSender<PrefetchProgress>;

/// Receiving half of a progress channel.
pub type ProgressReceiver = mpsc::UnboundedReceiver<PrefetchProgress>;

/// Create a progress channel.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}
