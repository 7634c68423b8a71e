//! Road geometry family.
//!
//! Fetches ways tagged with a whitelisted `highway` value (motorway through
//! unclassified and the `_link` variants) and keeps them as
//! polylines of at least two points.

use super::types::{HighwayClass, RoadFeature};
use super::FeatureFamily;
use crate::coord::Coordinate;
use crate::corridor;
use crate::provider::overpass::{self, OverpassElement};
use crate::provider::{HttpRequest, ProviderError};

/// Minimum vertices for a drawable road.
const MIN_VERTICES: usize = 2;

/// Road family bound to one Overpass endpoint.
#[derive(Debug, Clone)]
pub struct RoadFamily {
    endpoint: String,
}

impl RoadFamily {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// `^(motorway|trunk|...)$` for the highway filter.
    fn highway_pattern() -> String {
        let values: Vec<&str> = HighwayClass::ALL.iter().map(HighwayClass::as_str).collect();
        format!("^({})$", values.join("|"))
    }

    fn parse_element(element: &OverpassElement) -> Option<RoadFeature> {
        // Roads are plain ways; relations (routes) are not drawn
        let OverpassElement::Way(_) = element else {
            return None;
        };

        let highway_class = HighwayClass::from_tag(element.tag("highway")?)?;
        let geometry = element.outer_geometry();
        if geometry.len() < MIN_VERTICES {
            return None;
        }

        Some(RoadFeature {
            external_id: element.id(),
            highway_class,
            name: element.name(),
            geometry,
        })
    }
}

impl Default for RoadFamily {
    fn default() -> Self {
        Self::new(overpass::DEFAULT_OVERPASS_URL)
    }
}

impl FeatureFamily for RoadFamily {
    type Record = RoadFeature;
    type Key = i64;

    const NAME: &'static str = "roads";
    const RECORDS_FIELD: &'static str = "features";
    const USES_CORRIDOR_RADIUS: bool = true;
    const DEFAULT_INTERVAL_M: f64 = corridor::DEFAULT_LINE_INTERVAL_M;

    fn key(record: &RoadFeature) -> i64 {
        record.external_id
    }

    fn vertices(record: &RoadFeature) -> &[Coordinate] {
        &record.geometry
    }

    fn build_request(&self, point: Coordinate, radius_m: f64) -> HttpRequest {
        let statement = format!(
            "way[\"highway\"~\"{}\"]{};",
            Self::highway_pattern(),
            overpass::around(radius_m, point)
        );
        overpass::query_request(&self.endpoint, overpass::build_query(&[statement]))
    }

    fn parse(&self, _point: Coordinate, body: &[u8]) -> Result<Vec<RoadFeature>, ProviderError> {
        let elements = overpass::decode_elements(body)?;
        Ok(elements.iter().filter_map(Self::parse_element).collect())
    }
}
