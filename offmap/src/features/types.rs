//! Typed feature records, one per family.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;

/// Whitelisted OSM `highway` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighwayClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Unclassified,
    MotorwayLink,
    TrunkLink,
    PrimaryLink,
    SecondaryLink,
    TertiaryLink,
}

impl HighwayClass {
    pub const ALL: [HighwayClass; 11] = [
        HighwayClass::Motorway,
        HighwayClass::Trunk,
        HighwayClass::Primary,
        HighwayClass::Secondary,
        HighwayClass::Tertiary,
        HighwayClass::Unclassified,
        HighwayClass::MotorwayLink,
        HighwayClass::TrunkLink,
        HighwayClass::PrimaryLink,
        HighwayClass::SecondaryLink,
        HighwayClass::TertiaryLink,
    ];

    /// The OSM tag value.
    pub fn as_str(&self) -> &'static str {
        match self {
            HighwayClass::Motorway => "motorway",
            HighwayClass::Trunk => "trunk",
            HighwayClass::Primary => "primary",
            HighwayClass::Secondary => "secondary",
            HighwayClass::Tertiary => "tertiary",
            HighwayClass::Unclassified => "unclassified",
            HighwayClass::MotorwayLink => "motorway_link",
            HighwayClass::TrunkLink => "trunk_link",
            HighwayClass::PrimaryLink => "primary_link",
            HighwayClass::SecondaryLink => "secondary_link",
            HighwayClass::TertiaryLink => "tertiary_link",
        }
    }

    pub fn from_tag(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    pub fn is_link(&self) -> bool {
        self.as_str().ends_with("_link")
    }
}

impl fmt::Display for HighwayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of water body or watercourse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterType {
    River,
    Stream,
    Canal,
    Lake,
    Pond,
    Reservoir,
    /// `natural=water` without a recognized refinement.
    Water,
}

impl WaterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterType::River => "river",
            WaterType::Stream => "stream",
            WaterType::Canal => "canal",
            WaterType::Lake => "lake",
            WaterType::Pond => "pond",
            WaterType::Reservoir => "reservoir",
            WaterType::Water => "water",
        }
    }

    /// Watercourse values, mapped as lines.
    pub fn linear_from_tag(value: &str) -> Option<Self> {
        match value {
            "river" => Some(WaterType::River),
            "stream" => Some(WaterType::Stream),
            "canal" => Some(WaterType::Canal),
            _ => None,
        }
    }

    /// Standing-water values, mapped as areas.
    pub fn area_from_tag(value: &str) -> Option<Self> {
        match value {
            "lake" => Some(WaterType::Lake),
            "pond" => Some(WaterType::Pond),
            "reservoir" => Some(WaterType::Reservoir),
            _ => None,
        }
    }
}

impl fmt::Display for WaterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of vegetated or recreational land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanduseType {
    Forest,
    Meadow,
    Grass,
    Farmland,
    Wood,
    Park,
}

impl LanduseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanduseType::Forest => "forest",
            LanduseType::Meadow => "meadow",
            LanduseType::Grass => "grass",
            LanduseType::Farmland => "farmland",
            LanduseType::Wood => "wood",
            LanduseType::Park => "park",
        }
    }

    /// Values accepted for the `landuse` tag.
    pub fn from_landuse_tag(value: &str) -> Option<Self> {
        match value {
            "forest" => Some(LanduseType::Forest),
            "meadow" => Some(LanduseType::Meadow),
            "grass" => Some(LanduseType::Grass),
            "farmland" => Some(LanduseType::Farmland),
            _ => None,
        }
    }
}

impl fmt::Display for LanduseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A road polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadFeature {
    pub external_id: i64,
    pub highway_class: HighwayClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// At least 2 points.
    pub geometry: Vec<Coordinate>,
}

/// A watercourse line or water body outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterFeature {
    pub external_id: i64,
    pub water_type: WaterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// True for polygonal bodies, false for rivers, streams, and canals.
    pub is_area: bool,
    /// At least 2 points.
    pub geometry: Vec<Coordinate>,
}

/// A landuse outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanduseFeature {
    pub external_id: i64,
    pub landuse_type: LanduseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Outer ring, at least 3 points.
    pub geometry: Vec<Coordinate>,
}

/// A reverse-geocoded place name, keyed by the sample point it was resolved for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceLookup {
    pub coordinate: Coordinate,
    /// Short label, e.g. "Whitehall, London".
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_place_id: Option<u64>,
    pub cached_at: DateTime<Utc>,
}
