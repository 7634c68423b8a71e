//! Route-keyed feature store with write-through JSON persistence.
//!
//! One [`RouteFeatureStore`] exists per feature family. Records are grouped
//! by route id; within a route, records are unique by the family key (first
//! seen wins). Every route entry is mirrored to
//! `<dir>/<escaped route id>.json`, written to a temporary file and renamed
//! into place so a reader never sees a partial file.
//!
//! # File Format
//!
//! ```json
//! {
//!   "routeId": "home-to-work",
//!   "createdAt": "2026-10-19T08:12:44.120Z",
//!   "corridorRadius": 300.0,
//!   "features": [ ... ]
//! }
//! ```
//!
//! `corridorRadius` is present only for Overpass families; the records field
//! name is family-specific (`features`, `water`, `landuse`, `locations`).

mod entry;
mod route_store;

pub use entry::{route_file_stem, RouteCacheEntry};
pub use route_store::{RouteFeatureStore, StoreStats};

use std::path::PathBuf;

use thiserror::Error;

/// Errors from persisting or removing route files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
