//! Batch distance calculations with optional parallelism.
//!
//! Used to attach distance-from-origin to a whole result set at once. Items
//! without a usable position get `f64::INFINITY` so they sort last.

use crate::{haversine_distance, Coordinate};
use serde::{Deserialize, Serialize};

/// Distance from the origin to the item at `index` in the input slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// Position of the item in the input slice
    pub index: usize,
    /// Distance in kilometers (Infinity if the position is unknown)
    pub distance: f64,
}

impl DistanceResult {
    /// The distance, or `None` when the position was unknown.
    pub fn known(&self) -> Option<f64> {
        self.distance.is_finite().then_some(self.distance)
    }
}

/// Calculate distances from `origin` to every position.
///
/// # Example
/// ```
/// use tablemate_geo::{calculate_distances, Coordinate};
///
/// let origin = Coordinate::new(37.5665, 126.9780);
/// let points = vec![Some(Coordinate::new(37.4979, 127.0276)), None];
///
/// let results = calculate_distances(&origin, &points);
/// assert_eq!(results.len(), 2);
/// assert!(results[1].distance.is_infinite());
/// ```
pub fn calculate_distances(origin: &Coordinate, positions: &[Option<Coordinate>]) -> Vec<DistanceResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        positions
            .par_iter()
            .enumerate()
            .map(|(index, pos)| single_distance(origin, index, pos.as_ref()))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        positions
            .iter()
            .enumerate()
            .map(|(index, pos)| single_distance(origin, index, pos.as_ref()))
            .collect()
    }
}

/// Calculate distances and return them sorted closest first.
///
/// The sort is stable, so equal distances keep input order and unknown
/// positions stay at the end in input order.
pub fn calculate_distances_sorted(
    origin: &Coordinate,
    positions: &[Option<Coordinate>],
    max_results: Option<usize>,
) -> Vec<DistanceResult> {
    let mut results = calculate_distances(origin, positions);

    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    if let Some(max) = max_results {
        results.truncate(max);
    }

    results
}

/// Calculate distances for positions within `radius_km`, closest first.
pub fn calculate_distances_within_radius(
    origin: &Coordinate,
    positions: &[Option<Coordinate>],
    radius_km: f64,
) -> Vec<DistanceResult> {
    let mut results = calculate_distances_sorted(origin, positions, None);
    results.retain(|r| r.distance <= radius_km);
    results
}

#[inline]
fn single_distance(origin: &Coordinate, index: usize, pos: Option<&Coordinate>) -> DistanceResult {
    let distance = pos
        .map(|coord| haversine_distance(origin, coord))
        .unwrap_or(f64::INFINITY);

    DistanceResult { index, distance }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions() -> Vec<Option<Coordinate>> {
        vec![
            // Busan
            Some(Coordinate::new(35.1796, 129.0756)),
            // Gangnam
            Some(Coordinate::new(37.4979, 127.0276)),
            // unknown
            None,
            // Incheon
            Some(Coordinate::new(37.4563, 126.7052)),
        ]
    }

    const SEOUL: Coordinate = Coordinate { latitude: 37.5665, longitude: 126.9780 };

    #[test]
    fn test_batch_distances_keep_order() {
        let results = calculate_distances(&SEOUL, &positions());
        assert_eq!(results.len(), 4);
        assert!(results.iter().enumerate().all(|(i, r)| r.index == i));
        assert!(results[2].distance.is_infinite());
        assert!(results[2].known().is_none());
        assert!(results[1].known().unwrap() < 10.0);
    }

    #[test]
    fn test_sorted_distances() {
        let results = calculate_distances_sorted(&SEOUL, &positions(), None);
        let order: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_max_results() {
        let results = calculate_distances_sorted(&SEOUL, &positions(), Some(2));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_radius_filter() {
        let results = calculate_distances_within_radius(&SEOUL, &positions(), 50.0);
        let order: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 3]);
    }
}
