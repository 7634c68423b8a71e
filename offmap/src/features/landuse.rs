//! Landuse family: forests, meadows, grass, farmland, woods, and parks.

use super::types::{LanduseFeature, LanduseType};
use super::FeatureFamily;
use crate::coord::Coordinate;
use crate::corridor;
use crate::provider::overpass::{self, OverpassElement};
use crate::provider::{HttpRequest, ProviderError};

/// A valid area needs at least a triangle.
const MIN_VERTICES: usize = 3;

/// Landuse family bound to one Overpass endpoint.
#[derive(Debug, Clone)]
pub struct LanduseFamily {
    endpoint: String,
}

impl LanduseFamily {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    fn classify(element: &OverpassElement) -> Option<LanduseType> {
        if let Some(kind) = element.tag("landuse").and_then(LanduseType::from_landuse_tag) {
            return Some(kind);
        }
        if element.tag("natural") == Some("wood") {
            return Some(LanduseType::Wood);
        }
        if element.tag("leisure") == Some("park") {
            return Some(LanduseType::Park);
        }
        None
    }

    fn parse_element(element: &OverpassElement) -> Option<LanduseFeature> {
        let landuse_type = Self::classify(element)?;
        let geometry = element.outer_geometry();
        if geometry.len() < MIN_VERTICES {
            return None;
        }

        Some(LanduseFeature {
            external_id: element.id(),
            landuse_type,
            name: element.name(),
            geometry,
        })
    }
}

impl Default for LanduseFamily {
    fn default() -> Self {
        Self::new(overpass::DEFAULT_OVERPASS_URL)
    }
}

impl FeatureFamily for LanduseFamily {
    type Record = LanduseFeature;
    type Key = i64;

    const NAME: &'static str = "landuse";
    const RECORDS_FIELD: &'static str = "landuse";
    const USES_CORRIDOR_RADIUS: bool = true;
    const DEFAULT_INTERVAL_M: f64 = corridor::DEFAULT_AREA_INTERVAL_M;

    fn key(record: &LanduseFeature) -> i64 {
        record.external_id
    }

    fn vertices(record: &LanduseFeature) -> &[Coordinate] {
        &record.geometry
    }

    fn build_request(&self, point: Coordinate, radius_m: f64) -> HttpRequest {
        let area = overpass::around(radius_m, point);
        let mut statements = Vec::with_capacity(6);
        for kind in ["way", "relation"] {
            statements.push(format!(
                "{}[\"landuse\"~\"^(forest|meadow|grass|farmland)$\"]{};",
                kind, area
            ));
            statements.push(format!("{}[\"natural\"=\"wood\"]{};", kind, area));
            statements.push(format!("{}[\"leisure\"=\"park\"]{};", kind, area));
        }
        overpass::query_request(&self.endpoint, overpass::build_query(&statements))
    }

    fn parse(&self, _point: Coordinate, body: &[u8]) -> Result<Vec<LanduseFeature>, ProviderError> {
        let elements = overpass::decode_elements(body)?;
        Ok(elements.iter().filter_map(Self::parse_element).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str =
        r#"[{"lat": 1.0, "lon": 1.0}, {"lat": 1.0, "lon": 2.0}, {"lat": 2.0, "lon": 2.0}]"#;

    fn parse(json: &str) -> Vec<LanduseFeature> {
        LanduseFamily::default()
            .parse(Coordinate::new(0.0, 0.0), json.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_classification_priority() {
        let json = format!(
            r#"{{"elements": [
                {{"type": "way", "id": 1, "tags": {{"landuse": "forest", "leisure": "park"}}, "geometry": {t}}},
                {{"type": "way", "id": 2, "tags": {{"natural": "wood"}}, "geometry": {t}}},
                {{"type": "way", "id": 3, "tags": {{"leisure": "park", "name": "Hyde Park"}}, "geometry": {t}}},
                {{"type": "way", "id": 4, "tags": {{"landuse": "residential"}}, "geometry": {t}}},
                {{"type": "way", "id": 5, "tags": {{"landuse": "retail", "natural": "wood"}}, "geometry": {t}}}
            ]}}"#,
            t = TRIANGLE
        );
        let landuse = parse(&json);
        let kinds: Vec<(i64, LanduseType)> =
            landuse.iter().map(|l| (l.external_id, l.landuse_type)).collect();

        assert_eq!(
            kinds,
            vec![
                (1, LanduseType::Forest),
                (2, LanduseType::Wood),
                (3, LanduseType::Park),
                (5, LanduseType::Wood),
            ]
        );
        assert_eq!(landuse[2].name.as_deref(), Some("Hyde Park"));
    }

    #[test]
    fn test_two_point_outline_rejected() {
        let json = r#"{"elements": [{"type": "way", "id": 1, "tags": {"landuse": "meadow"},
            "geometry": [{"lat": 1.0, "lon": 1.0}, {"lat": 1.0, "lon": 2.0}]}]}"#;
        assert!(parse(json).is_empty());
    }

    #[test]
    fn test_relation_outer_members_joined() {
        let json = r#"{"elements": [{"type": "relation", "id": 9, "tags": {"landuse": "farmland"},
            "members": [
                {"type": "way", "role": "outer", "geometry": [{"lat": 1.0, "lon": 1.0}, {"lat": 1.0, "lon": 2.0}]},
                {"type": "way", "role": "outer", "geometry": [{"lat": 2.0, "lon": 2.0}]},
                {"type": "way", "role": "inner", "geometry": [{"lat": 1.2, "lon": 1.2}, {"lat": 1.3, "lon": 1.3}]}
            ]}]}"#;
        let landuse = parse(json);
        assert_eq!(landuse.len(), 1);
        assert_eq!(landuse[0].landuse_type, LanduseType::Farmland);
        assert_eq!(landuse[0].geometry.len(), 3);
    }

    #[test]
    fn test_build_request_includes_ways_and_relations() {
        let request = LanduseFamily::default().build_request(Coordinate::new(0.5, 0.5), 4000.0);
        let query = request.param_value("data").unwrap();
        assert!(query.contains("way[\"natural\"=\"wood\"]"));
        assert!(query.contains("relation[\"leisure\"=\"park\"]"));
        assert!(query.contains("relation[\"landuse\"~\"^(forest|meadow|grass|farmland)$\"]"));
    }
}
