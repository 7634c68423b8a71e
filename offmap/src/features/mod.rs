//! Feature families: query builders and response parsers
//!
//! Each family (roads, water, landuse, place names) knows how to ask its
//! upstream host about the area around one sample point and how to turn the
//! answer into typed records. The prefetch loop and the route store are
//! generic over [`FeatureFamily`], so adding a family means implementing
//! this trait and nothing else.
//!
//! | Family | Host | Key | Min vertices | Records field |
//! |--------|------|-----|--------------|---------------|
//! | [`RoadFamily`] | Overpass | externalId | 2 | `features` |
//! | [`WaterFamily`] | Overpass | externalId | 2 | `water` |
//! | [`LanduseFamily`] | Overpass | externalId | 3 | `landuse` |
//! | [`GeocodeFamily`] | Nominatim | sample coordinate | 1 | `locations` |
//!
//! Parsers never fail on individual elements: anything that does not meet
//! the family's rules is discarded. Only a body that is not the expected
//! document at all is an error.

mod geocode;
mod landuse;
mod road;
mod types;
mod water;

pub use geocode::GeocodeFamily;
pub use landuse::LanduseFamily;
pub use road::RoadFamily;
pub use types::{
    HighwayClass, LanduseFeature, LanduseType, PlaceLookup, RoadFeature, WaterFeature, WaterType,
};
pub use water::WaterFamily;

use std::fmt::Debug;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::coord::Coordinate;
use crate::provider::{HttpRequest, ProviderError};

/// One kind of cached map data.
pub trait FeatureFamily: Send + Sync + 'static {
    /// Typed record produced by the parser and stored per route.
    type Record: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Deduplication key; unique within a route entry.
    type Key: Clone + Debug + Eq + Hash + Send + Sync + 'static;

    /// Family name, also the cache subdirectory.
    const NAME: &'static str;

    /// Name of the records array in persisted route files.
    const RECORDS_FIELD: &'static str;

    /// Whether route entries carry the corridor radius they were fetched with.
    const USES_CORRIDOR_RADIUS: bool;

    /// Sample interval used when nothing else is configured.
    const DEFAULT_INTERVAL_M: f64;

    /// Dedup key of a record.
    fn key(record: &Self::Record) -> Self::Key;

    /// Vertices used for bounding-box filtering and distance queries.
    fn vertices(record: &Self::Record) -> &[Coordinate];

    /// Build the upstream request for one sample point.
    fn build_request(&self, point: Coordinate, radius_m: f64) -> HttpRequest;

    /// Parse a successful response body into records.
    fn parse(&self, point: Coordinate, body: &[u8]) -> Result<Vec<Self::Record>, ProviderError>;
}
