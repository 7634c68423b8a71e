//! Water family: rivers, streams, canals, and standing water.
//!
//! # Classification
//!
//! Tags are checked in priority order:
//!
//! 1. `waterway` = river | stream | canal: linear
//! 2. `natural=water`: area, refined by the optional `water` sub-tag
//! 3. bare `water` tag: area, unless the value is itself a watercourse type
//!
//! Relations contribute only their `outer` members.

use super::types::{WaterFeature, WaterType};
use super::FeatureFamily;
use crate::coord::Coordinate;
use crate::corridor;
use crate::provider::overpass::{self, OverpassElement};
use crate::provider::{HttpRequest, ProviderError};

/// Minimum vertices for a watercourse line or outline.
const MIN_VERTICES: usize = 2;

/// Water family bound to one Overpass endpoint.
#[derive(Debug, Clone)]
pub struct WaterFamily {
    endpoint: String,
}

impl WaterFamily {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Returns `(water_type, is_area)` or `None` if the element is not water.
    fn classify(element: &OverpassElement) -> Option<(WaterType, bool)> {
        if let Some(kind) = element.tag("waterway").and_then(WaterType::linear_from_tag) {
            return Some((kind, false));
        }

        if element.tag("natural") == Some("water") {
            let kind = element
                .tag("water")
                .and_then(|v| WaterType::area_from_tag(v).or_else(|| WaterType::linear_from_tag(v)))
                .unwrap_or(WaterType::Water);
            return Some((kind, true));
        }

        let value = element.tag("water")?;
        if let Some(kind) = WaterType::linear_from_tag(value) {
            return Some((kind, false));
        }
        Some((WaterType::area_from_tag(value).unwrap_or(WaterType::Water), true))
    }

    fn parse_element(element: &OverpassElement) -> Option<WaterFeature> {
        let (water_type, is_area) = Self::classify(element)?;
        let geometry = element.outer_geometry();
        if geometry.len() < MIN_VERTICES {
            return None;
        }

        Some(WaterFeature {
            external_id: element.id(),
            water_type,
            name: element.name(),
            is_area,
            geometry,
        })
    }
}

impl Default for WaterFamily {
    fn default() -> Self {
        Self::new(overpass::DEFAULT_OVERPASS_URL)
    }
}

impl FeatureFamily for WaterFamily {
    type Record = WaterFeature;
    type Key = i64;

    const NAME: &'static str = "water";
    const RECORDS_FIELD: &'static str = "water";
    const USES_CORRIDOR_RADIUS: bool = true;
    const DEFAULT_INTERVAL_M: f64 = corridor::DEFAULT_AREA_INTERVAL_M;

    fn key(record: &WaterFeature) -> i64 {
        record.external_id
    }

    fn vertices(record: &WaterFeature) -> &[Coordinate] {
        &record.geometry
    }

    fn build_request(&self, point: Coordinate, radius_m: f64) -> HttpRequest {
        let area = overpass::around(radius_m, point);
        let statements = vec![
            format!("way[\"waterway\"~\"^(river|stream|canal)$\"]{};", area),
            format!("way[\"natural\"=\"water\"]{};", area),
            format!("relation[\"natural\"=\"water\"]{};", area),
            format!("way[\"water\"~\"^(lake|pond|reservoir)$\"]{};", area),
            format!("relation[\"water\"~\"^(lake|pond|reservoir)$\"]{};", area),
        ];
        overpass::query_request(&self.endpoint, overpass::build_query(&statements))
    }

    fn parse(&self, _point: Coordinate, body: &[u8]) -> Result<Vec<WaterFeature>, ProviderError> {
        let elements = overpass::decode_elements(body)?;
        Ok(elements.iter().filter_map(Self::parse_element).collect())
    }
}
