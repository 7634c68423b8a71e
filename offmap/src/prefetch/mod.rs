//! Route prefetching.
//!
//! A [`PrefetchCoordinator`] walks the sample points of one route for one
//! feature family:
//!
//! ```text
//! route ─► corridor::sample ─► for each point:
//!                                 pacer wait ─► request ─► parse
//!                                 ─► store.upsert ─► snapshot persist
//!                                 ─► progress event
//!          ─► final persist ─► complete event
//! ```
//!
//! A failed sample point is logged and skipped; only bad geometry, a failed
//! final write, or cancellation end the run with an error.

mod coordinator;
mod progress;

pub use coordinator::PrefetchCoordinator;
pub use progress::{progress_channel, PrefetchProgress, ProgressReceiver, ProgressSender};
