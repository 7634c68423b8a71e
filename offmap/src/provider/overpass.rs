//! Overpass API wire format.
//!
//! The feature API answers `{"elements": [...]}` where each element is a
//! `way` or `relation` carrying inline geometry (requested with `out geom`).
//! Elements are decoded one at a time into [`OverpassElement`]; anything
//! that does not decode (nodes, missing ids, odd shapes) is dropped so a
//! single bad element never discards the rest of the response.
//!
//! # Query shape
//!
//! ```text
//! [out:json][timeout:25];
//! (
//!   way["highway"~"^(motorway|trunk)$"](around:500,51.5,-0.1);
//! );
//! out geom;
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use super::types::{HttpRequest, ProviderError};
use crate::coord::Coordinate;

/// Public Overpass endpoint used when no other is configured.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Server-side timeout requested in every query, in seconds.
const QUERY_TIMEOUT_SECS: u32 = 25;

/// A point of inline geometry.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeometryPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeometryPoint> for Coordinate {
    fn from(p: GeometryPoint) -> Self {
        Coordinate::new(p.lat, p.lon)
    }
}

/// A way with its inline geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassWay {
    pub id: i64,
    #[serde(default)]
    pub geometry: Vec<Option<GeometryPoint>>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// A relation member. Only member geometry is used.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassMember {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub geometry: Vec<Option<GeometryPoint>>,
}

/// A multipolygon-style relation.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassRelation {
    pub id: i64,
    #[serde(default)]
    pub members: Vec<OverpassMember>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// One decoded Overpass element.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverpassElement {
    Way(OverpassWay),
    Relation(OverpassRelation),
}

impl OverpassElement {
    pub fn id(&self) -> i64 {
        match self {
            OverpassElement::Way(w) => w.id,
            OverpassElement::Relation(r) => r.id,
        }
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        match self {
            OverpassElement::Way(w) => &w.tags,
            OverpassElement::Relation(r) => &r.tags,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags().get(key).map(String::as_str)
    }

    pub fn name(&self) -> Option<String> {
        self.tag("name")
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string)
    }

    /// Geometry for the element.
    ///
    /// Ways return their own vertices. Relations return the concatenated
    /// vertices of their `outer` members; inner rings (holes, islands) are
    /// ignored, so only an approximate outer boundary is kept.
    pub fn outer_geometry(&self) -> Vec<Coordinate> {
        match self {
            OverpassElement::Way(w) => w
                .geometry
                .iter()
                .flatten()
                .map(|&p| Coordinate::from(p))
                .collect(),
            OverpassElement::Relation(r) => r
                .members
                .iter()
                .filter(|m| m.role == "outer")
                .flat_map(|m| m.geometry.iter().flatten().map(|&p| Coordinate::from(p)))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct OverpassResponse {
    elements: Vec<serde_json::Value>,
}

/// Decode a response body into elements, discarding undecodable ones.
pub fn decode_elements(body: &[u8]) -> Result<Vec<OverpassElement>, ProviderError> {
    let response: OverpassResponse = serde_json::from_slice(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Overpass body: {}", e)))?;

    let total = response.elements.len();
    let elements: Vec<OverpassElement> = response
        .elements
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if elements.len() < total {
        tracing::trace!(
            total,
            decoded = elements.len(),
            "Dropped undecodable Overpass elements"
        );
    }

    Ok(elements)
}

/// `(around:R,lat,lon)` filter for a circular region.
pub fn around(radius_m: f64, center: Coordinate) -> String {
    format!(
        "(around:{:.0},{:.6},{:.6})",
        radius_m.max(1.0),
        center.lat,
        center.lon
    )
}

/// Wrap filter statements into a complete query requesting inline geometry.
pub fn build_query(statements: &[String]) -> String {
    let mut query = format!("[out:json][timeout:{}];\n(\n", QUERY_TIMEOUT_SECS);
    for statement in statements {
        query.push_str("  ");
        query.push_str(statement);
        query.push('\n');
    }
    query.push_str(");\nout geom;");
    query
}

/// POST request carrying the query as the `data` form field.
pub fn query_request(url: &str, query: String) -> HttpRequest {
    HttpRequest::post_form(url).param("data", query)
}
