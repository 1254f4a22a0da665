//! Geospatial primitives for tablemate restaurant discovery.
//!
//! This crate provides:
//! - Haversine distance calculations
//! - Inclusive bounding-box containment (national bounds, map areas)
//! - Map regions, zoom levels and viewport fitting
//! - Batch distance calculation with optional parallelism
//!
//! # Example
//!
//! ```
//! use tablemate_geo::{haversine_distance, Coordinate};
//!
//! let seoul = Coordinate::new(37.5665, 126.9780);
//! let busan = Coordinate::new(35.1796, 129.0756);
//!
//! let distance_km = haversine_distance(&seoul, &busan);
//! assert!((distance_km - 325.0).abs() < 10.0);
//! ```

mod bounds;
mod error;
mod haversine;
mod region;
pub mod batch;

pub use batch::{
    calculate_distances, calculate_distances_sorted, calculate_distances_within_radius, DistanceResult,
};
pub use bounds::{is_within_bounds, BoundingBox};
pub use error::{GeoError, GeoErrorCode, Result};
pub use haversine::{
    approximate_distance, distance_km, haversine_distance, haversine_distance_meters,
    EARTH_RADIUS_KM, EARTH_RADIUS_M,
};
pub use region::{fit_coordinates, MapRegion, ViewportOptions};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Returns true if both components are finite and inside the WGS84 ranges.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Arithmetic mean of a set of coordinates.
    ///
    /// Returns `None` for an empty iterator.
    pub fn mean<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let (mut lat, mut lng, mut n) = (0.0, 0.0, 0usize);
        for c in coords {
            lat += c.latitude;
            lng += c.longitude;
            n += 1;
        }
        if n == 0 {
            return None;
        }
        Some(Self::new(lat / n as f64, lng / n as f64))
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(37.5, f64::NAN).is_valid());
        assert!(!Coordinate::new(f64::INFINITY, 127.0).is_valid());
    }

    #[test]
    fn test_coordinate_from_tuple() {
        let coord: Coordinate = (37.5665, 126.9780).into();
        assert_eq!(coord.latitude, 37.5665);
        assert_eq!(coord.longitude, 126.9780);
    }

    #[test]
    fn test_mean() {
        let points = [Coordinate::new(37.0, 127.0), Coordinate::new(38.0, 128.0)];
        let mean = Coordinate::mean(&points).unwrap();
        assert!((mean.latitude - 37.5).abs() < 1e-12);
        assert!((mean.longitude - 127.5).abs() < 1e-12);
        assert!(Coordinate::mean(&Vec::<Coordinate>::new()).is_none());
    }
}
