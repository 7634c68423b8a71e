//! Nominatim reverse-geocoding wire format.
//!
//! # URL Pattern
//!
//! `{base}/reverse?lat={lat}&lon={lon}&format=json&addressdetails=1&zoom=18`
//!
//! - A descriptive `User-Agent` is mandatory under the public usage policy
//! - A 200 response may still carry an `error` field ("Unable to geocode"),
//!   which means "no result" rather than a failure

use serde::Deserialize;

use super::types::{HttpRequest, ProviderError};
use crate::coord::Coordinate;

/// Public Nominatim endpoint used when no other is configured.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Structured address components. All fields are optional upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimAddress {
    pub road: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
}

/// Body of a `/reverse` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseResponse {
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: NominatimAddress,
    pub place_id: Option<u64>,
    pub error: Option<String>,
}

/// Decode a `/reverse` body.
pub fn decode_reverse(body: &[u8]) -> Result<ReverseResponse, ProviderError> {
    serde_json::from_slice(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Nominatim body: {}", e)))
}

/// Build a single-point reverse lookup request.
pub fn reverse_request(base_url: &str, point: Coordinate, user_agent: &str) -> HttpRequest {
    let url = format!("{}/reverse", base_url.trim_end_matches('/'));
    HttpRequest::get(url)
        .param("lat", format!("{:.6}", point.lat))
        .param("lon", format!("{:.6}", point.lon))
        .param("format", "json")
        .param("addressdetails", "1")
        .param("zoom", "18")
        .header("User-Agent", user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_request_shape() {
        let request = reverse_request(
            "https://nominatim.example.org/",
            Coordinate::new(51.5074, -0.1278),
            "offmap-test/1.0",
        );
        assert_eq!(request.url, "https://nominatim.example.org/reverse");
        assert_eq!(request.param_value("lat"), Some("51.507400"));
        assert_eq!(request.param_value("lon"), Some("-0.127800"));
        assert_eq!(request.param_value("addressdetails"), Some("1"));
        assert!(request
            .headers
            .iter()
            .any(|(k, v)| k == "User-Agent" && v == "offmap-test/1.0"));
    }

    #[test]
    fn test_decode_full_response() {
        let body = r#"{
            "place_id": 12345,
            "display_name": "Whitehall, Westminster, London, Greater London, England, SW1A 2DD, United Kingdom",
            "address": {"road": "Whitehall", "city": "London", "state": "England",
                        "country": "United Kingdom", "postcode": "SW1A 2DD"}
        }"#;
        let response = decode_reverse(body.as_bytes()).unwrap();
        assert_eq!(response.place_id, Some(12345));
        assert_eq!(response.address.road.as_deref(), Some("Whitehall"));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_decode_error_response() {
        let response = decode_reverse(br#"{"error": "Unable to geocode"}"#).unwrap();
        assert_eq!(response.error.as_deref(), Some("Unable to geocode"));
        assert!(response.display_name.is_none());
    }

    #[test]
    fn test_decode_invalid_body() {
        assert!(decode_reverse(b"not json").is_err());
    }
}
