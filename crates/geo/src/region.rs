//! Map regions and viewport fitting.
//!
//! A region is a center plus latitude/longitude deltas, the shape native map
//! views report when the user stops panning.

use crate::{BoundingBox, Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};

/// Visible map area: center and full span in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    /// Creates a region, rejecting non-finite values and non-positive spans.
    pub fn new(latitude: f64, longitude: f64, latitude_delta: f64, longitude_delta: f64) -> Result<Self> {
        let center = Coordinate::new(latitude, longitude);
        if !center.is_valid() {
            return Err(GeoError::InvalidCoordinate(format!(
                "region center ({}, {})",
                latitude, longitude
            )));
        }
        if !(latitude_delta.is_finite() && latitude_delta > 0.0)
            || !(longitude_delta.is_finite() && longitude_delta > 0.0)
        {
            return Err(GeoError::InvalidRegion(format!(
                "deltas must be positive, got ({}, {})",
                latitude_delta, longitude_delta
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            latitude_delta,
            longitude_delta,
        })
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Zoom level as `log2(360 / longitude_delta)`.
    ///
    /// ```
    /// use tablemate_geo::MapRegion;
    ///
    /// let region = MapRegion::new(37.5, 127.0, 0.1, 360.0 / 2048.0).unwrap();
    /// assert!((region.zoom_level() - 11.0).abs() < 1e-9);
    /// ```
    pub fn zoom_level(&self) -> f64 {
        (360.0 / self.longitude_delta).log2()
    }

    /// Area covered by the region.
    pub fn bounds(&self) -> BoundingBox {
        let half_lat = self.latitude_delta / 2.0;
        let half_lng = self.longitude_delta / 2.0;
        BoundingBox::new(
            self.latitude - half_lat,
            self.latitude + half_lat,
            self.longitude - half_lng,
            self.longitude + half_lng,
        )
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        self.bounds().contains(coord)
    }
}

/// Padding rules used when fitting the map to a result set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportOptions {
    /// Multiplier applied to the span of the matches
    pub padding_factor: f64,
    /// Lower bound for either delta
    pub min_delta: f64,
    /// Delta used when exactly one point is fitted
    pub single_point_delta: f64,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            padding_factor: 1.5,
            min_delta: 0.01,
            single_point_delta: 0.005,
        }
    }
}

/// Recommends a region that shows every coordinate.
///
/// One point gets a tight zoom centered on it. Several points get their
/// bounding box scaled by `padding_factor`, with each delta at least
/// `min_delta`. No points yields `None`.
pub fn fit_coordinates(coords: &[Coordinate], options: &ViewportOptions) -> Option<MapRegion> {
    match coords {
        [] => None,
        [only] => Some(MapRegion {
            latitude: only.latitude,
            longitude: only.longitude,
            latitude_delta: options.single_point_delta,
            longitude_delta: options.single_point_delta,
        }),
        _ => {
            let bounds = BoundingBox::from_coordinates(coords)?;
            let center = bounds.center();
            Some(MapRegion {
                latitude: center.latitude,
                longitude: center.longitude,
                latitude_delta: (bounds.latitude_span() * options.padding_factor).max(options.min_delta),
                longitude_delta: (bounds.longitude_span() * options.padding_factor).max(options.min_delta),
            })
        }
    }
}
