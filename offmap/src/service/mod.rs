//! Offline map service facade.
//!
//! [`OfflineMapService`] owns everything a collaborator needs: the four
//! family stores, one paced client per upstream host (sharing a single HTTP
//! client), and the configuration. Navigation code calls the `prefetch_*`
//! methods while online and [`OfflineMapService::lookup`] while driving.
//!
//! # Example
//!
//! ```ignore
//! let service = OfflineMapService::from_config(ConfigFile::load()?)?;
//! service.initialize()?;
//!
//! let (tx, mut rx) = progress_channel();
//! let cancel = CancellationToken::new();
//! let roads = service.prefetch_roads("commute", route.points(), Some(&tx), &cancel).await?;
//!
//! let here = service.lookup().nearest_place(position, 100.0);
//! ```

mod offline_map;

pub use offline_map::{OfflineMapService, PrefetchSummary, ServiceStats};
