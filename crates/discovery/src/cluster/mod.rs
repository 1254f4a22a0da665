//! Zoom-adaptive marker clustering.
//!
//! Clusters are rebuilt from scratch on every call in two phases:
//!
//! 1. **Greedy radius grouping.** The zoom level picks a radius from the
//!    step table. Restaurants are visited in input order; each joins the
//!    first existing cluster (creation order) whose centroid is within the
//!    radius, or starts a new one. Joining recomputes the centroid as the
//!    mean of all members. With the first-fit strategy the outcome depends
//!    on input order.
//! 2. **Selective merge.** Pairs of clusters whose markers would almost
//!    completely overlap on screen are merged, under thresholds strict
//!    enough that unrelated restaurants are never combined. See [`merge`].

mod merge;
mod transition;

pub use transition::{diff_clusters, ClusterTransition, TransitionKind};

use serde::Serialize;
use tablemate_core::config::{ClusterConfig, ClusterStrategy};
use tablemate_core::Restaurant;
use tablemate_geo::{haversine_distance, BoundingBox, Coordinate};

/// A group of restaurants rendered as one map marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Centroid latitude
    pub latitude: f64,
    /// Centroid longitude
    pub longitude: f64,
    /// Members, never empty
    pub restaurants: Vec<Restaurant>,
    #[serde(skip)]
    positions: Vec<Coordinate>,
}

impl Cluster {
    fn new(restaurant: Restaurant, position: Coordinate) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            restaurants: vec![restaurant],
            positions: vec![position],
        }
    }

    /// Add a member and move the centroid to the mean of all members.
    fn push(&mut self, restaurant: Restaurant, position: Coordinate) {
        self.restaurants.push(restaurant);
        self.positions.push(position);
        if let Some(mean) = Coordinate::mean(&self.positions) {
            self.latitude = mean.latitude;
            self.longitude = mean.longitude;
        }
    }

    /// Absorb another cluster and place the result at `center`.
    fn absorb(&mut self, other: Cluster, center: Coordinate) {
        self.restaurants.extend(other.restaurants);
        self.positions.extend(other.positions);
        self.latitude = center.latitude;
        self.longitude = center.longitude;
    }

    /// Marker position.
    pub fn centroid(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Member positions, in member order.
    pub fn positions(&self) -> &[Coordinate] {
        &self.positions
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    /// Always false; a cluster has at least one member.
    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    /// Member ids, in member order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.restaurants.iter().map(|r| r.id.as_str())
    }
}

/// Groups restaurants into map clusters for a zoom level.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    config: ClusterConfig,
    bounds: BoundingBox,
}

impl ClusterEngine {
    /// Engine using `config`; positions outside `bounds` are skipped.
    pub fn new(config: ClusterConfig, bounds: BoundingBox) -> Self {
        Self { config, bounds }
    }

    /// Settings in use.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Radius used by phase one at `zoom`.
    pub fn radius_km(&self, zoom: f64) -> f64 {
        self.config.radius_km(zoom)
    }

    /// Cluster `restaurants` for `zoom`.
    ///
    /// Restaurants without a usable position are left out; every other
    /// restaurant ends up in exactly one cluster.
    pub fn cluster(&self, restaurants: &[Restaurant], zoom: f64) -> Vec<Cluster> {
        let grouped = self.group(restaurants, zoom);
        let phase_one = grouped.len();
        let clusters = merge::merge_overlapping(grouped, zoom, &self.config);

        tracing::debug!(
            zoom,
            restaurants = restaurants.len(),
            phase_one,
            clusters = clusters.len(),
            "Clusters rebuilt"
        );
        clusters
    }

    fn group(&self, restaurants: &[Restaurant], zoom: f64) -> Vec<Cluster> {
        let radius = self.config.radius_km(zoom);
        let mut clusters: Vec<Cluster> = Vec::new();

        for restaurant in restaurants {
            let Some(position) = restaurant.coordinate(&self.bounds) else {
                continue;
            };

            match self.find_cluster(&clusters, &position, radius) {
                Some(i) => clusters[i].push(restaurant.clone(), position),
                None => clusters.push(Cluster::new(restaurant.clone(), position)),
            }
        }

        clusters
    }

    fn find_cluster(&self, clusters: &[Cluster], position: &Coordinate, radius: f64) -> Option<usize> {
        let within = clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (i, haversine_distance(&c.centroid(), position)))
            .filter(|(_, d)| *d <= radius);

        match self.config.strategy {
            ClusterStrategy::FirstFit => within.map(|(i, _)| i).next(),
            ClusterStrategy::NearestFit => within.min_by(|a, b| a.1.total_cmp(&b.1)).map(|(i, _)| i),
        }
    }
}
