//! Geographic value types shared by every module.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors raised when coordinates or route files are malformed.
#[derive(Debug, Error)]
pub enum CoordError {
    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),

    #[error("Failed to read route file {path}: {source}")]
    RouteRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse route file {path}: {source}")]
    RouteParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A WGS84 position in degrees. No altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check that both components are finite and within WGS84 ranges.
    pub fn validate(&self) -> Result<(), CoordError> {
        if !self.lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&self.lat) {
            return Err(CoordError::InvalidLatitude(self.lat));
        }
        if !self.lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&self.lon) {
            return Err(CoordError::InvalidLongitude(self.lon));
        }
        Ok(())
    }

    /// Bit-exact identity, used where a coordinate acts as a map key.
    pub fn key(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lon.to_bits())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// Axis-aligned latitude/longitude box with inclusive edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Box of `radius_m` around `center`, used for rough display windows.
    pub fn around(center: Coordinate, radius_m: f64) -> Self {
        let dlat = (radius_m / super::EARTH_RADIUS_M).to_degrees();
        let cos_lat = center.lat.to_radians().cos().abs().max(1e-6);
        let dlon = dlat / cos_lat;
        Self {
            min_lat: center.lat - dlat,
            max_lat: center.lat + dlat,
            min_lon: center.lon - dlon,
            max_lon: center.lon + dlon,
        }
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }

    /// True if at least one vertex lies inside the box.
    pub fn intersects_any(&self, vertices: &[Coordinate]) -> bool {
        vertices.iter().any(|v| self.contains(v))
    }
}

/// Ordered sequence of coordinates describing a planned path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteGeometry(pub Vec<Coordinate>);

/// On-disk route formats accepted by [`RouteGeometry::load`].
#[derive(Deserialize)]
#[serde(untagged)]
enum RouteFile {
    Pairs(Vec<[f64; 2]>),
    Document {
        #[serde(rename = "routeId")]
        route_id: Option<String>,
        coordinates: Vec<[f64; 2]>,
    },
}

impl RouteGeometry {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total great-circle length in meters.
    pub fn length_m(&self) -> f64 {
        self.0
            .windows(2)
            .map(|w| super::haversine_m(&w[0], &w[1]))
            .sum()
    }

    /// Parse a route from JSON text.
    ///
    /// Accepts either a bare `[[lat, lon], ...]` array or an object
    /// `{"routeId": "...", "coordinates": [[lat, lon], ...]}`. The embedded
    /// route id, if any, is returned alongside the geometry.
    pub fn from_json(text: &str) -> Result<(Option<String>, Self), serde_json::Error> {
        let file: RouteFile = serde_json::from_str(text)?;
        let (route_id, pairs) = match file {
            RouteFile::Pairs(pairs) => (None, pairs),
            RouteFile::Document {
                route_id,
                coordinates,
            } => (route_id, coordinates),
        };
        let points = pairs
            .into_iter()
            .map(|[lat, lon]| Coordinate::new(lat, lon))
            .collect();
        Ok((route_id, Self(points)))
    }

    /// Load a route file from disk. See [`RouteGeometry::from_json`].
    pub fn load(path: &Path) -> Result<(Option<String>, Self), CoordError> {
        let text = fs::read_to_string(path).map_err(|source| CoordError::RouteRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| CoordError::RouteParse {
            path: path.display().to_string(),
            source,
        })
    }
}

impl From<Vec<Coordinate>> for RouteGeometry {
    fn from(points: Vec<Coordinate>) -> Self {
        Self(points)
    }
}
