//! Reverse-geocoded place names.
//!
//! One request per sample point. The record is keyed by the sample point
//! itself, not by the upstream place id, so the nearest-place lookup can
//! compare the driver's position against the points the route was sampled at.

use chrono::Utc;

use super::types::PlaceLookup;
use super::FeatureFamily;
use crate::coord::Coordinate;
use crate::corridor;
use crate::provider::nominatim::{self, NominatimAddress};
use crate::provider::{HttpRequest, ProviderError};

/// Reverse-geocoding family bound to one Nominatim host.
#[derive(Debug, Clone)]
pub struct GeocodeFamily {
    base_url: String,
    user_agent: String,
}

impl GeocodeFamily {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: user_agent.into(),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// First present of city, town, village, municipality.
    fn locality(address: &NominatimAddress) -> Option<String> {
        [
            &address.city,
            &address.town,
            &address.village,
            &address.municipality,
        ]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
    }

    /// Short label: "road, locality", either one alone, or the first two
    /// segments of the full display name.
    fn short_name(
        street: Option<&str>,
        locality: Option<&str>,
        display_name: Option<&str>,
    ) -> Option<String> {
        match (street, locality) {
            (Some(road), Some(place)) => Some(format!("{}, {}", road, place)),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => {
                let segments: Vec<&str> = display_name?
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .take(2)
                    .collect();
                if segments.is_empty() {
                    None
                } else {
                    Some(segments.join(", "))
                }
            }
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Default for GeocodeFamily {
    fn default() -> Self {
        Self::new(
            nominatim::DEFAULT_NOMINATIM_URL,
            concat!("offmap/", env!("CARGO_PKG_VERSION")),
        )
    }
}

impl FeatureFamily for GeocodeFamily {
    type Record = PlaceLookup;
    type Key = (u64, u64);

    const NAME: &'static str = "places";
    const RECORDS_FIELD: &'static str = "locations";
    const USES_CORRIDOR_RADIUS: bool = false;
    const DEFAULT_INTERVAL_M: f64 = corridor::DEFAULT_LINE_INTERVAL_M;

    fn key(record: &PlaceLookup) -> (u64, u64) {
        record.coordinate.key()
    }

    fn vertices(record: &PlaceLookup) -> &[Coordinate] {
        std::slice::from_ref(&record.coordinate)
    }

    fn build_request(&self, point: Coordinate, _radius_m: f64) -> HttpRequest {
        nominatim::reverse_request(&self.base_url, point, &self.user_agent)
    }

    fn parse(&self, point: Coordinate, body: &[u8]) -> Result<Vec<PlaceLookup>, ProviderError> {
        let response = nominatim::decode_reverse(body)?;
        if let Some(error) = response.error {
            tracing::debug!(point = %point, error = %error, "No reverse geocode result");
            return Ok(Vec::new());
        }

        let address = &response.address;
        let street = non_blank(&address.road);
        let locality = Self::locality(address);

        let Some(display_name) = Self::short_name(
            street.as_deref(),
            locality.as_deref(),
            response.display_name.as_deref(),
        ) else {
            return Ok(Vec::new());
        };

        Ok(vec![PlaceLookup {
            coordinate: point,
            display_name,
            street,
            locality,
            region: non_blank(&address.county).or_else(|| non_blank(&address.state)),
            country: non_blank(&address.country),
            postcode: non_blank(&address.postcode),
            external_place_id: response.place_id,
            cached_at: Utc::now(),
        }])
    }
}
