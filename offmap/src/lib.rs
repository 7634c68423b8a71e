//! offmap - Offline map data for low-power navigation devices
//!
//! While a connection is available, offmap samples a planned route, asks
//! public geodata hosts (an Overpass feature API and a Nominatim reverse
//! geocoder) about the corridor around it, and caches roads, water,
//! landuse and place names per route on local storage. While driving, the
//! same cache answers bounding-box and nearest-place queries with no network.
//!
//! # Layout
//!
//! - [`coord`]: coordinates, bounding boxes, route geometry
//! - [`corridor`]: arc-length route sampling
//! - [`provider`]: HTTP seam and upstream wire formats
//! - [`pacing`]: per-host minimum request spacing
//! - [`features`]: per-family query builders and parsers
//! - [`store`]: route-keyed record store with JSON persistence
//! - [`prefetch`]: the sampling and querying loop
//! - [`lookup`]: offline queries
//! - [`service`]: the facade tying it together
//! - [`config`], [`logging`]: ambient setup

pub mod config;
pub mod coord;
pub mod corridor;
pub mod error;
pub mod features;
pub mod logging;
pub mod lookup;
pub mod pacing;
pub mod prefetch;
pub mod provider;
pub mod service;
pub mod store;

pub use error::PrefetchError;
pub use service::OfflineMapService;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
