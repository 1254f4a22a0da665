//! Matching freshly built clusters against the previous set for animation.
//!
//! Clusters have no identity across rebuilds, so matching is by proximity.

use super::Cluster;
use serde::Serialize;
use std::time::Duration;
use tablemate_geo::{haversine_distance, Coordinate};

const SAME_POSITION_EPSILON: f64 = 1e-9;

/// How a cluster relates to the clusters shown before a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// Grew out of two or more prior clusters; animated
    Merge,
    /// Same position and member count as a prior cluster
    Unchanged,
    /// Anything else; shown at its final position
    New,
}

/// A rebuilt cluster with its start position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterTransition {
    /// The rebuilt cluster
    pub cluster: Cluster,
    /// How it relates to the previous set
    pub kind: TransitionKind,
    /// Start of the animation; the final centroid unless merged
    pub from: Coordinate,
}

impl ClusterTransition {
    /// True if this cluster moves during the animation window.
    pub fn is_animated(&self) -> bool {
        self.kind == TransitionKind::Merge
    }

    /// Marker position `elapsed` into an animation of length `duration`.
    ///
    /// Only merges interpolate; the fraction is clamped to `[0, 1]`.
    pub fn position_at(&self, elapsed: Duration, duration: Duration) -> Coordinate {
        let to = self.cluster.centroid();
        if !self.is_animated() {
            return to;
        }
        let t = if duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
        };
        Coordinate::new(
            self.from.latitude + (to.latitude - self.from.latitude) * t,
            self.from.longitude + (to.longitude - self.from.longitude) * t,
        )
    }
}

/// Tag each cluster in `current` against `previous`.
///
/// `radius_km` is the grouping radius at the new zoom level.
pub fn diff_clusters(previous: &[Cluster], current: Vec<Cluster>, radius_km: f64) -> Vec<ClusterTransition> {
    current
        .into_iter()
        .map(|cluster| {
            let to = cluster.centroid();
            let (kind, from) = classify(previous, &cluster, &to, radius_km);
            ClusterTransition { cluster, kind, from }
        })
        .collect()
}

fn classify(previous: &[Cluster], cluster: &Cluster, to: &Coordinate, radius_km: f64) -> (TransitionKind, Coordinate) {
    let unchanged = previous.iter().any(|p| {
        p.len() == cluster.len()
            && (p.latitude - to.latitude).abs() <= SAME_POSITION_EPSILON
            && (p.longitude - to.longitude).abs() <= SAME_POSITION_EPSILON
    });
    if unchanged {
        return (TransitionKind::Unchanged, *to);
    }

    let sources: Vec<Coordinate> = previous
        .iter()
        .map(Cluster::centroid)
        .filter(|c| haversine_distance(c, to) <= radius_km)
        .collect();

    match Coordinate::mean(&sources) {
        Some(from) if sources.len() >= 2 => (TransitionKind::Merge, from),
        _ => (TransitionKind::New, *to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablemate_core::Restaurant;

    fn single(id: &str, lat: f64, lng: f64) -> Cluster {
        Cluster::new(Restaurant::new(id, id), Coordinate::new(lat, lng))
    }

    fn pair(lat: f64, lng: f64, lat2: f64, lng2: f64) -> Cluster {
        let mut c = single("a", lat, lng);
        c.push(Restaurant::new("b", "b"), Coordinate::new(lat2, lng2));
        c
    }

    #[test]
    fn test_unchanged() {
        let before = vec![single("a", 37.5, 127.0)];
        let after = vec![single("a", 37.5, 127.0)];
        let t = diff_clusters(&before, after, 0.1);
        assert_eq!(t[0].kind, TransitionKind::Unchanged);
        assert!(!t[0].is_animated());
    }

    #[test]
    fn test_merge_from_two_priors() {
        let before = vec![single("a", 37.500, 127.0), single("b", 37.502, 127.0)];
        let after = vec![pair(37.500, 127.0, 37.502, 127.0)];
        let t = diff_clusters(&before, after, 0.6);

        assert_eq!(t[0].kind, TransitionKind::Merge);
        assert!((t[0].from.latitude - 37.501).abs() < 1e-12);
    }

    #[test]
    fn test_new_when_nothing_nearby() {
        let before = vec![single("a", 37.5, 127.0)];
        let after = vec![single("z", 35.1, 129.0)];
        let t = diff_clusters(&before, after, 0.6);
        assert_eq!(t[0].kind, TransitionKind::New);
        assert_eq!(t[0].from, Coordinate::new(35.1, 129.0));
    }

    #[test]
    fn test_one_prior_nearby_is_new() {
        // moved but did not absorb anything
        let before = vec![single("a", 37.5, 127.0)];
        let after = vec![pair(37.5, 127.0, 37.501, 127.0)];
        assert_eq!(diff_clusters(&before, after, 0.6)[0].kind, TransitionKind::New);
    }

    #[test]
    fn test_position_at_interpolates_merges() {
        let before = vec![single("a", 37.500, 127.0), single("b", 37.504, 127.0)];
        let after = vec![pair(37.500, 127.0, 37.502, 127.0)];
        let t = &diff_clusters(&before, after, 0.6)[0];
        let duration = Duration::from_millis(800);

        assert_eq!(t.position_at(Duration::ZERO, duration), t.from);
        let end = t.position_at(duration, duration);
        assert!((end.latitude - t.cluster.latitude).abs() < 1e-12);
        assert_eq!(t.position_at(Duration::from_secs(5), duration), end);

        let halfway = t.position_at(Duration::from_millis(400), duration);
        assert!((halfway.latitude - 37.5015).abs() < 1e-9);
    }

    #[test]
    fn test_position_at_static_for_new() {
        let t = &diff_clusters(&[], vec![single("a", 37.5, 127.0)], 0.6)[0];
        let p = t.position_at(Duration::from_millis(10), Duration::from_millis(800));
        assert_eq!(p, Coordinate::new(37.5, 127.0));
    }
}
