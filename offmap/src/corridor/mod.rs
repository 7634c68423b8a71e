//! Route corridor sampling.
//!
//! Reduces a route's coordinate sequence to a sparse set of sample points
//! spaced by arc length. Each sample point becomes the center of one
//! bounded-radius query, so the samples together tile the travel corridor.
//!
//! # Algorithm
//!
//! ```text
//! route:    A ──── B ──── C ──────── D ── E
//! distance:   400m   700m     1200m   300m
//! interval: 1000m
//!
//! samples:  A             C          D    E
//!           (first)   (1100m)    (1200m) (last)
//! ```
//!
//! The first and last points are always included, so short routes are still
//! covered at both ends.

use thiserror::Error;

use crate::coord::{haversine_m, CoordError, Coordinate};

/// Default sample interval for line-like families (roads, place names).
pub const DEFAULT_LINE_INTERVAL_M: f64 = 1_500.0;

/// Default sample interval for area-like families (water, landuse).
///
/// Polygonal features change less often along a path than roads do.
pub const DEFAULT_AREA_INTERVAL_M: f64 = 4_000.0;

/// Errors raised for malformed sampling input.
#[derive(Debug, Error)]
pub enum CorridorError {
    #[error("Invalid coordinate at index {index}: {source}")]
    InvalidCoordinate {
        index: usize,
        #[source]
        source: CoordError,
    },

    #[error("Sample interval must be a positive number of meters, got {0}")]
    InvalidInterval(f64),
}

/// Sample `geometry` every `interval_m` meters of arc length.
///
/// Returns the first point, every point at which the accumulated distance
/// since the previous sample reaches `interval_m`, and the final point.
/// An empty geometry yields no samples; a single point yields itself.
pub fn sample(geometry: &[Coordinate], interval_m: f64) -> Result<Vec<Coordinate>, CorridorError> {
    if !interval_m.is_finite() || interval_m <= 0.0 {
        return Err(CorridorError::InvalidInterval(interval_m));
    }

    for (index, point) in geometry.iter().enumerate() {
        point
            .validate()
            .map_err(|source| CorridorError::InvalidCoordinate { index, source })?;
    }

    let Some(first) = geometry.first() else {
        return Ok(Vec::new());
    };

    let mut samples = vec![*first];
    let mut last_emitted = 0usize;
    let mut accumulated = 0.0;

    for (i, pair) in geometry.windows(2).enumerate() {
        accumulated += haversine_m(&pair[0], &pair[1]);
        if accumulated >= interval_m {
            samples.push(pair[1]);
            last_emitted = i + 1;
            accumulated = 0.0;
        }
    }

    let last_index = geometry.len() - 1;
    if last_emitted != last_index {
        samples.push(geometry[last_index]);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    #[test]
    fn test_empty_geometry_yields_nothing() {
        assert!(sample(&[], 1000.0).unwrap().is_empty());
    }

    #[test]
    fn test_single_point_yields_itself() {
        let p = c(51.5, -0.1);
        assert_eq!(sample(&[p], 1000.0).unwrap(), vec![p]);
    }

    #[test]
    fn test_short_route_yields_start_and_end() {
        // ~222 m apart, well under the interval
        let route = [c(51.5, -0.1), c(51.502, -0.1)];
        let samples = sample(&route, 1000.0).unwrap();
        assert_eq!(samples, vec![route[0], route[1]]);
    }

    #[test]
    fn test_end_point_not_duplicated_when_emitted_by_interval() {
        // ~1112 m apart: the interval emits the end, the final rule must not repeat it
        let route = [c(51.5, -0.1), c(51.51, -0.1)];
        let samples = sample(&route, 1000.0).unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_accumulator_resets_after_emission() {
        // Ten hops of ~222 m each, 2.2 km total, interval 500 m
        let route: Vec<_> = (0..=10).map(|i| c(51.5 + 0.002 * i as f64, -0.1)).collect();
        let samples = sample(&route, 500.0).unwrap();

        // Emits at every third hop (666 m >= 500 m): indices 0, 3, 6, 9, then last (10)
        assert_eq!(
            samples,
            vec![route[0], route[3], route[6], route[9], route[10]]
        );
    }

    #[test]
    fn test_identical_points_collapse_to_first_and_last() {
        let p = c(10.0, 10.0);
        let samples = sample(&[p, p, p], 1000.0).unwrap();
        assert_eq!(samples, vec![p, p]);
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        let route = [c(51.5, -0.1)];
        assert!(matches!(
            sample(&route, 0.0),
            Err(CorridorError::InvalidInterval(_))
        ));
        assert!(matches!(
            sample(&route, f64::NAN),
            Err(CorridorError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_coordinate() {
        let route = [c(51.5, -0.1), c(123.0, 0.0)];
        match sample(&route, 1000.0) {
            Err(CorridorError::InvalidCoordinate { index, .. }) => assert_eq!(index, 1),
            other => panic!("Expected InvalidCoordinate, got {:?}", other),
        }
    }

    fn arb_route() -> impl Strategy<Value = Vec<Coordinate>> {
        prop::collection::vec((-60.0f64..60.0, -170.0f64..170.0), 2..40).prop_map(|pts| {
            pts.into_iter()
                .map(|(lat, lon)| Coordinate::new(lat, lon))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_first_and_last_always_sampled(route in arb_route(), interval in 10.0f64..50_000.0) {
            let samples = sample(&route, interval).unwrap();
            prop_assert_eq!(samples.first(), route.first());
            prop_assert_eq!(samples.last(), route.last());
        }

        #[test]
        fn prop_never_more_samples_than_points(route in arb_route(), interval in 10.0f64..50_000.0) {
            let samples = sample(&route, interval).unwrap();
            prop_assert!(samples.len() <= route.len());
            prop_assert!(samples.len() >= 2);
        }
    }
}
