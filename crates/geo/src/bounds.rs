//! Inclusive bounding-box containment.
//!
//! Restaurant coordinates are only trusted inside a configured national box.
//! The `(0, 0)` sentinel and out-of-country points fail the test and are
//! treated as absent.

use crate::Coordinate;
use serde::{Deserialize, Serialize};

/// An axis-aligned latitude/longitude box. All edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Mainland South Korea plus Jeju and Ulleungdo.
    pub const SOUTH_KOREA: BoundingBox = BoundingBox {
        min_latitude: 33.0,
        max_latitude: 38.9,
        min_longitude: 124.5,
        max_longitude: 132.0,
    };

    pub fn new(min_latitude: f64, max_latitude: f64, min_longitude: f64, max_longitude: f64) -> Self {
        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    /// Smallest box containing every coordinate, or `None` if there are none.
    pub fn from_coordinates<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let init = Self::new(first.latitude, first.latitude, first.longitude, first.longitude);

        Some(iter.fold(init, |b, c| Self {
            min_latitude: b.min_latitude.min(c.latitude),
            max_latitude: b.max_latitude.max(c.latitude),
            min_longitude: b.min_longitude.min(c.longitude),
            max_longitude: b.max_longitude.max(c.longitude),
        }))
    }

    /// Inclusive containment test. Non-finite coordinates are never contained.
    #[inline]
    pub fn contains(&self, coord: &Coordinate) -> bool {
        is_within_bounds(coord.latitude, coord.longitude, self)
    }

    /// True when the minimums do not exceed the maximums.
    pub fn is_ordered(&self) -> bool {
        self.min_latitude <= self.max_latitude && self.min_longitude <= self.max_longitude
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_latitude + self.max_latitude) / 2.0,
            (self.min_longitude + self.max_longitude) / 2.0,
        )
    }

    pub fn latitude_span(&self) -> f64 {
        self.max_latitude - self.min_latitude
    }

    pub fn longitude_span(&self) -> f64 {
        self.max_longitude - self.min_longitude
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::SOUTH_KOREA
    }
}

/// Inclusive bounding-box test on raw latitude/longitude values.
///
/// # Example
/// ```
/// use tablemate_geo::{is_within_bounds, BoundingBox};
///
/// assert!(is_within_bounds(37.5665, 126.9780, &BoundingBox::SOUTH_KOREA));
/// assert!(!is_within_bounds(0.0, 0.0, &BoundingBox::SOUTH_KOREA));
/// ```
#[inline]
pub fn is_within_bounds(lat: f64, lon: f64, bounds: &BoundingBox) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && lat >= bounds.min_latitude
        && lat <= bounds.max_latitude
        && lon >= bounds.min_longitude
        && lon <= bounds.max_longitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_rejected() {
        assert!(!is_within_bounds(0.0, 0.0, &BoundingBox::SOUTH_KOREA));
    }

    #[test]
    fn test_edges_inclusive() {
        let b = BoundingBox::SOUTH_KOREA;
        assert!(is_within_bounds(33.0, 124.5, &b));
        assert!(is_within_bounds(38.9, 132.0, &b));
        assert!(!is_within_bounds(38.900001, 127.0, &b));
        assert!(!is_within_bounds(37.0, 124.499999, &b));
    }

    #[test]
    fn test_non_finite_rejected() {
        let b = BoundingBox::SOUTH_KOREA;
        assert!(!is_within_bounds(f64::NAN, 127.0, &b));
        assert!(!b.contains(&Coordinate::new(37.0, f64::INFINITY)));
    }

    #[test]
    fn test_tokyo_outside() {
        assert!(!BoundingBox::SOUTH_KOREA.contains(&Coordinate::new(35.6762, 139.6503)));
    }

    #[test]
    fn test_from_coordinates() {
        let points = [
            Coordinate::new(37.50, 127.02),
            Coordinate::new(37.56, 126.97),
            Coordinate::new(37.52, 127.05),
        ];
        let b = BoundingBox::from_coordinates(&points).unwrap();
        assert_eq!(b.min_latitude, 37.50);
        assert_eq!(b.max_latitude, 37.56);
        assert_eq!(b.min_longitude, 126.97);
        assert_eq!(b.max_longitude, 127.05);
        assert!(points.iter().all(|p| b.contains(p)));
        assert!(BoundingBox::from_coordinates(&Vec::<Coordinate>::new()).is_none());
    }

    #[test]
    fn test_center_and_spans() {
        let b = BoundingBox::new(37.0, 38.0, 127.0, 129.0);
        assert_eq!(b.center(), Coordinate::new(37.5, 128.0));
        assert_eq!(b.latitude_span(), 1.0);
        assert_eq!(b.longitude_span(), 2.0);
        assert!(b.is_ordered());
        assert!(!BoundingBox::new(38.0, 37.0, 127.0, 129.0).is_ordered());
    }
}
