//! Offline queries over cached route data.
//!
//! [`OfflineLookup`] never touches the network. It borrows the same store
//! instances the prefetch loop writes into, so a lookup running during a
//! prefetch sees each route either before or after an upsert.

use crate::coord::{haversine_m, BoundingBox, Coordinate};
use crate::features::{
    GeocodeFamily, LanduseFamily, LanduseFeature, PlaceLookup, RoadFamily, RoadFeature,
    WaterFamily, WaterFeature,
};
use crate::store::RouteFeatureStore;

/// Default radius within which a cached place name counts as "here".
pub const DEFAULT_PLACE_THRESHOLD_M: f64 = 100.0;

/// A cached place and how far it is from the queried position.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestPlace {
    pub place: PlaceLookup,
    pub distance_m: f64,
}

/// Read-only view over the four family stores.
#[derive(Clone, Copy)]
pub struct OfflineLookup<'a> {
    roads: &'a RouteFeatureStore<RoadFamily>,
    water: &'a RouteFeatureStore<WaterFamily>,
    landuse: &'a RouteFeatureStore<LanduseFamily>,
    places: &'a RouteFeatureStore<GeocodeFamily>,
}

impl<'a> OfflineLookup<'a> {
    pub fn new(
        roads: &'a RouteFeatureStore<RoadFamily>,
        water: &'a RouteFeatureStore<WaterFamily>,
        landuse: &'a RouteFeatureStore<LanduseFamily>,
        places: &'a RouteFeatureStore<GeocodeFamily>,
    ) -> Self {
        Self {
            roads,
            water,
            landuse,
            places,
        }
    }

    pub fn roads_in_bounds(&self, bounds: &BoundingBox) -> Vec<RoadFeature> {
        self.roads.get_in_bounds(bounds)
    }

    pub fn water_in_bounds(&self, bounds: &BoundingBox) -> Vec<WaterFeature> {
        self.water.get_in_bounds(bounds)
    }

    pub fn landuse_in_bounds(&self, bounds: &BoundingBox) -> Vec<LanduseFeature> {
        self.landuse.get_in_bounds(bounds)
    }

    pub fn all_roads(&self) -> Vec<RoadFeature> {
        self.roads.get_all()
    }

    pub fn all_water(&self) -> Vec<WaterFeature> {
        self.water.get_all()
    }

    pub fn all_landuse(&self) -> Vec<LanduseFeature> {
        self.landuse.get_all()
    }

    pub fn all_places(&self) -> Vec<PlaceLookup> {
        self.places.get_all()
    }

    /// Closest cached place strictly within `threshold_m` of `position`.
    ///
    /// Ties keep the first place in store order.
    pub fn nearest_place(&self, position: Coordinate, threshold_m: f64) -> Option<NearestPlace> {
        let mut best: Option<NearestPlace> = None;

        for place in self.places.get_all() {
            let distance_m = haversine_m(&position, &place.coordinate);
            let closer = best
                .as_ref()
                .map_or(true, |current| distance_m < current.distance_m);
            if closer {
                best = Some(NearestPlace { place, distance_m });
            }
        }

        best.filter(|nearest| nearest.distance_m < threshold_m)
    }
}
