//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::Coordinate;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in kilometers between two latitude/longitude pairs.
///
/// Symmetric, and zero for identical points.
///
/// # Example
/// ```
/// use tablemate_geo::distance_km;
///
/// // Gangnam station to Seoul station
/// let d = distance_km(37.4979, 127.0276, 37.5547, 126.9707);
/// assert!((d - 8.1).abs() < 0.5);
/// ```
#[inline]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_distance(&Coordinate::new(lat1, lon1), &Coordinate::new(lat2, lon2))
}

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// # Example
/// ```
/// use tablemate_geo::{haversine_distance, Coordinate};
///
/// let seoul = Coordinate::new(37.5665, 126.9780);
/// let busan = Coordinate::new(35.1796, 129.0756);
///
/// let distance = haversine_distance(&seoul, &busan);
/// assert!((distance - 325.0).abs() < 10.0);
/// ```
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_KM)
}

/// Calculates the great-circle distance between two coordinates in meters.
#[inline]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_M)
}

#[inline]
fn haversine_distance_with_radius(from: &Coordinate, to: &Coordinate, radius: f64) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    radius * c
}

/// Fast approximate distance in kilometers (equirectangular projection).
///
/// Good enough at city scale; use [`haversine_distance`] for anything that is
/// compared against a threshold.
#[inline]
pub fn approximate_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let x = (lon2 - lon1) * ((lat1 + lat2) / 2.0).cos();
    let y = lat2 - lat1;

    (x * x + y * y).sqrt() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SEOUL_CITY_HALL: Coordinate = Coordinate { latitude: 37.5665, longitude: 126.9780 };
    const BUSAN_STATION: Coordinate = Coordinate { latitude: 35.1151, longitude: 129.0415 };
    const GANGNAM: Coordinate = Coordinate { latitude: 37.4979, longitude: 127.0276 };
    const JEJU: Coordinate = Coordinate { latitude: 33.4996, longitude: 126.5312 };

    #[test]
    fn test_seoul_to_busan() {
        let distance = haversine_distance(&SEOUL_CITY_HALL, &BUSAN_STATION);
        assert!((distance - 329.0).abs() < 10.0, "Seoul-Busan: {}", distance);
    }

    #[test]
    fn test_seoul_to_jeju() {
        let distance = haversine_distance(&SEOUL_CITY_HALL, &JEJU);
        assert!((distance - 454.0).abs() < 10.0, "Seoul-Jeju: {}", distance);
    }

    #[test]
    fn test_same_point_zero_distance() {
        assert_eq!(haversine_distance(&GANGNAM, &GANGNAM), 0.0);
        assert_eq!(distance_km(37.0, 127.0, 37.0, 127.0), 0.0);
    }

    #[test]
    fn test_distance_km_matches_coordinate_form() {
        let a = distance_km(37.5665, 126.9780, 37.4979, 127.0276);
        let b = haversine_distance(&SEOUL_CITY_HALL, &GANGNAM);
        assert_eq!(a, b);
    }

    #[test]
    fn test_meters_conversion() {
        let km = haversine_distance(&SEOUL_CITY_HALL, &GANGNAM);
        let meters = haversine_distance_meters(&SEOUL_CITY_HALL, &GANGNAM);
        assert!((meters - km * 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_approximate_distance_city_scale() {
        let exact = haversine_distance(&SEOUL_CITY_HALL, &GANGNAM);
        let approx = approximate_distance(&SEOUL_CITY_HALL, &GANGNAM);
        let error = ((approx - exact) / exact).abs();
        assert!(error < 0.001, "Error: {}%", error * 100.0);
    }

    fn korea() -> impl Strategy<Value = Coordinate> {
        (33.0f64..38.9, 124.5f64..132.0).prop_map(|(lat, lng)| Coordinate::new(lat, lng))
    }

    proptest! {
        #[test]
        fn prop_identity(p in korea()) {
            prop_assert!(haversine_distance(&p, &p).abs() < 1e-9);
        }

        #[test]
        fn prop_symmetric(a in korea(), b in korea()) {
            let d1 = haversine_distance(&a, &b);
            let d2 = haversine_distance(&b, &a);
            prop_assert!((d1 - d2).abs() < 1e-9);
        }

        #[test]
        fn prop_triangle_inequality(a in korea(), b in korea(), c in korea()) {
            let ab = haversine_distance(&a, &b);
            let bc = haversine_distance(&b, &c);
            let ac = haversine_distance(&a, &c);
            prop_assert!(ac <= ab + bc + 1e-6);
        }
    }
}
