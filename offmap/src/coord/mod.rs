//! Coordinate and distance primitives
//!
//! Provides the WGS84 [`Coordinate`] type, bounding boxes, route geometry
//! loading, and great-circle distance on a spherical Earth.

mod types;

pub use types::{
    BoundingBox, CoordError, Coordinate, RouteGeometry, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON,
};

/// Mean Earth radius used for haversine distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine formula).
#[inline]
pub fn haversine_m(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        let london = Coordinate::new(51.5074, -0.1278);
        assert_eq!(haversine_m(&london, &london), 0.0);
    }

    #[test]
    fn test_haversine_short_north_south_hop() {
        // 0.002 degrees of latitude is roughly 222 m
        let a = Coordinate::new(51.5, -0.1);
        let b = Coordinate::new(51.502, -0.1);
        let d = haversine_m(&a, &b);
        assert!((d - 222.4).abs() < 1.0, "distance was {}", d);
    }

    #[test]
    fn test_haversine_london_to_paris() {
        let london = Coordinate::new(51.5074, -0.1278);
        let paris = Coordinate::new(48.8566, 2.3522);
        let d = haversine_m(&london, &paris);
        assert!((d - 343_500.0).abs() < 2_000.0, "distance was {}", d);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = Coordinate::new(40.7128, -74.0060);
        let b = Coordinate::new(34.0522, -118.2437);
        assert!((haversine_m(&a, &b) - haversine_m(&b, &a)).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -181.0).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
        assert!(Coordinate::new(-90.0, 180.0).validate().is_ok());
    }

    #[test]
    fn test_bounding_box_contains_edges() {
        let bbox = BoundingBox::new(51.0, 52.0, -1.0, 0.0);
        assert!(bbox.contains(&Coordinate::new(51.0, -1.0)));
        assert!(bbox.contains(&Coordinate::new(52.0, 0.0)));
        assert!(!bbox.contains(&Coordinate::new(52.1, -0.5)));
    }

    #[test]
    fn test_bounding_box_around_contains_center() {
        let center = Coordinate::new(51.5074, -0.1278);
        let bbox = BoundingBox::around(center, 500.0);
        assert!(bbox.contains(&center));
        assert!(bbox.max_lat - bbox.min_lat > 0.008);
    }

    #[test]
    fn test_route_from_pairs() {
        let (id, route) = RouteGeometry::from_json("[[51.5, -0.1], [51.6, -0.2]]").unwrap();
        assert!(id.is_none());
        assert_eq!(route.len(), 2);
        assert_eq!(route.points()[1], Coordinate::new(51.6, -0.2));
    }

    #[test]
    fn test_route_from_document() {
        let json = r#"{"routeId": "home-work", "coordinates": [[51.5, -0.1]]}"#;
        let (id, route) = RouteGeometry::from_json(json).unwrap();
        assert_eq!(id.as_deref(), Some("home-work"));
        assert_eq!(route.len(), 1);
    }

    #[test]
    fn test_route_from_document_without_id() {
        let (id, route) = RouteGeometry::from_json(r#"{"coordinates": []}"#).unwrap();
        assert!(id.is_none());
        assert!(route.is_empty());
    }

    #[test]
    fn test_route_length() {
        let route = RouteGeometry::new(vec![
            Coordinate::new(51.5, -0.1),
            Coordinate::new(51.502, -0.1),
            Coordinate::new(51.504, -0.1),
        ]);
        assert!((route.length_m() - 444.8).abs() < 2.0);
    }

    #[test]
    fn test_coordinate_serde_shape() {
        let json = serde_json::to_string(&Coordinate::new(1.5, 2.5)).unwrap();
        assert_eq!(json, r#"{"lat":1.5,"lon":2.5}"#);
    }
}
