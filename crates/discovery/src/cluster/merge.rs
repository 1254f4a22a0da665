//! Phase two: merge clusters whose markers would overlap on screen.
//!
//! This is a rendering heuristic, not semantic grouping. A marker is
//! `marker_size_px` wide; at a given zoom that is `marker_size_px *
//! km_per_pixel` kilometers on the ground, with radius `r` half of that.
//! Two clusters are candidates when their centroids are closer than one
//! marker width. A candidate pair merges only if all of these hold:
//!
//! - overlap ratio `max(0, 2r - d) / 2r` reaches `overlap_threshold`
//! - centroid distance is at most `centroid_ratio * r`, and at least
//!   `pair_ratio` of member cross-pairs are within half a marker
//! - every member stays within `max_member_offset_m` of the merged center,
//!   which is the per-axis median of all member positions
//!
//! Each cluster is visited once, in order, and absorbs at most
//! `max_merge_per_cluster` later clusters.

use super::Cluster;
use tablemate_core::config::ClusterConfig;
use tablemate_geo::{haversine_distance, haversine_distance_meters, Coordinate};

/// Marker geometry at one zoom level, in kilometers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkerGeometry {
    pub size_km: f64,
    pub radius_km: f64,
}

impl MarkerGeometry {
    pub(crate) fn at_zoom(zoom: f64, config: &ClusterConfig) -> Self {
        let size_km = config.marker_size_px * config.km_per_pixel(zoom);
        Self {
            size_km,
            radius_km: size_km / 2.0,
        }
    }

    fn overlap_ratio(&self, distance_km: f64) -> f64 {
        let diameter = 2.0 * self.radius_km;
        (diameter - distance_km).max(0.0) / diameter
    }
}

pub(crate) fn merge_overlapping(clusters: Vec<Cluster>, zoom: f64, config: &ClusterConfig) -> Vec<Cluster> {
    if clusters.len() < 2 || config.max_merge_per_cluster == 0 {
        return clusters;
    }

    let marker = MarkerGeometry::at_zoom(zoom, config);
    let mut slots: Vec<Option<Cluster>> = clusters.into_iter().map(Some).collect();
    let n = slots.len();

    for i in 0..n {
        let mut merged = 0;
        for j in (i + 1)..n {
            if merged >= config.max_merge_per_cluster {
                break;
            }
            let (Some(a), Some(b)) = (&slots[i], &slots[j]) else {
                continue;
            };
            let Some(center) = merge_center(a, b, &marker, config) else {
                continue;
            };

            if let Some(other) = slots[j].take() {
                if let Some(target) = slots[i].as_mut() {
                    tracing::trace!(
                        into = i,
                        from = j,
                        members = target.len() + other.len(),
                        "Merging overlapping clusters"
                    );
                    target.absorb(other, center);
                    merged += 1;
                }
            }
        }
    }

    slots.into_iter().flatten().collect()
}

/// Merged center if `a` and `b` pass every merge check.
fn merge_center(a: &Cluster, b: &Cluster, marker: &MarkerGeometry, config: &ClusterConfig) -> Option<Coordinate> {
    let distance = haversine_distance(&a.centroid(), &b.centroid());

    if distance >= marker.size_km {
        return None;
    }
    if marker.overlap_ratio(distance) < config.overlap_threshold {
        return None;
    }
    if !passes_strict_check(a, b, distance, marker, config) {
        return None;
    }
    optimal_center(a, b, config.max_member_offset_m)
}

/// Predicate (b): centroids nearly coincide and members pairwise overlap.
pub(crate) fn passes_strict_check(
    a: &Cluster,
    b: &Cluster,
    distance_km: f64,
    marker: &MarkerGeometry,
    config: &ClusterConfig,
) -> bool {
    if distance_km > config.centroid_ratio * marker.radius_km {
        return false;
    }

    let half_marker = marker.size_km / 2.0;
    let total = a.positions().len() * b.positions().len();
    if total == 0 {
        return false;
    }
    let close = a
        .positions()
        .iter()
        .flat_map(|p| b.positions().iter().map(move |q| haversine_distance(p, q)))
        .filter(|d| *d <= half_marker)
        .count();

    close as f64 / total as f64 >= config.pair_ratio
}

/// Per-axis median of all member positions, if every member is close to it.
fn optimal_center(a: &Cluster, b: &Cluster, max_offset_m: f64) -> Option<Coordinate> {
    let all: Vec<Coordinate> = a.positions().iter().chain(b.positions()).copied().collect();
    let center = Coordinate::new(
        median(all.iter().map(|c| c.latitude).collect())?,
        median(all.iter().map(|c| c.longitude).collect())?,
    );

    all.iter()
        .all(|p| haversine_distance_meters(p, &center) <= max_offset_m)
        .then_some(center)
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablemate_core::Restaurant;

    const METER_LAT: f64 = 1.0 / 111_195.0;
    // at 37.5°N
    const METER_LNG: f64 = 1.0 / 88_216.0;
    const BASE: Coordinate = Coordinate { latitude: 37.5, longitude: 127.0 };

    fn offset(north_m: f64, east_m: f64) -> Coordinate {
        Coordinate::new(BASE.latitude + north_m * METER_LAT, BASE.longitude + east_m * METER_LNG)
    }

    fn cluster_of(members: &[(&str, Coordinate)]) -> Cluster {
        let mut iter = members.iter();
        let (id, first) = iter.next().unwrap();
        let mut cluster = Cluster::new(Restaurant::new(*id, *id), *first);
        for (id, pos) in iter {
            cluster.push(Restaurant::new(*id, *id), *pos);
        }
        cluster
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(vec![]), None);
    }

    #[test]
    fn test_marker_geometry() {
        let marker = MarkerGeometry::at_zoom(17.0, &ClusterConfig::default());
        assert!((marker.size_km - 0.048).abs() < 1e-12);
        assert!((marker.radius_km - 0.024).abs() < 1e-12);
        assert_eq!(marker.overlap_ratio(0.0), 1.0);
        assert_eq!(marker.overlap_ratio(1.0), 0.0);
    }

    #[test]
    fn test_nearly_coincident_clusters_merge() {
        let a = cluster_of(&[("a", offset(0.0, 0.0))]);
        let b = cluster_of(&[("b", offset(1.0, 0.0))]);

        let merged = merge_overlapping(vec![a, b], 17.0, &ClusterConfig::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].len(), 2);
        // median of two points is their midpoint
        assert!((merged[0].latitude - offset(0.5, 0.0).latitude).abs() < 1e-12);
    }

    #[test]
    fn test_separated_clusters_stay_apart() {
        let a = cluster_of(&[("a", offset(0.0, 0.0))]);
        let b = cluster_of(&[("b", offset(30.0, 0.0))]);
        assert_eq!(merge_overlapping(vec![a, b], 17.0, &ClusterConfig::default()).len(), 2);
    }

    #[test]
    fn test_spread_members_block_merge() {
        // centroids coincide, but two members sit 10 m from any median center
        let a = cluster_of(&[("a1", offset(0.0, -10.0)), ("a2", offset(0.0, 10.0))]);
        let b = cluster_of(&[("b", offset(0.0, 0.0))]);
        assert_eq!(merge_overlapping(vec![a, b], 17.0, &ClusterConfig::default()).len(), 2);
    }

    #[test]
    fn test_at_most_one_absorption_per_cluster() {
        let a = cluster_of(&[("a", offset(0.0, 0.0))]);
        let b = cluster_of(&[("b", offset(0.5, 0.0))]);
        let c = cluster_of(&[("c", offset(1.0, 0.0))]);

        let merged = merge_overlapping(vec![a, b, c], 17.0, &ClusterConfig::default());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(merged[1].ids().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn test_merge_disabled() {
        let config = ClusterConfig {
            max_merge_per_cluster: 0,
            ..ClusterConfig::default()
        };
        let a = cluster_of(&[("a", offset(0.0, 0.0))]);
        let b = cluster_of(&[("b", offset(1.0, 0.0))]);
        assert_eq!(merge_overlapping(vec![a, b], 17.0, &config).len(), 2);
    }

    #[test]
    fn test_no_remaining_pair_passes_strict_check() {
        let config = ClusterConfig::default();
        let marker = MarkerGeometry::at_zoom(17.0, &config);
        let clusters = vec![
            cluster_of(&[("a", offset(0.0, 0.0))]),
            cluster_of(&[("b", offset(1.0, 0.0))]),
            cluster_of(&[("c", offset(40.0, 0.0))]),
            cluster_of(&[("d", offset(41.0, 0.5))]),
            cluster_of(&[("e", offset(100.0, 0.0))]),
        ];

        let merged = merge_overlapping(clusters, 17.0, &config);
        assert_eq!(merged.len(), 3);
        for (i, x) in merged.iter().enumerate() {
            for y in merged.iter().skip(i + 1) {
                let d = haversine_distance(&x.centroid(), &y.centroid());
                assert!(
                    marker.overlap_ratio(d) < config.overlap_threshold
                        || !passes_strict_check(x, y, d, &marker, &config)
                );
            }
        }
    }
}
