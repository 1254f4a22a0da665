//! Configuration schema definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tablemate_geo::{BoundingBox, ViewportOptions};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// National bounding box; coordinates outside it are treated as absent
    #[serde(default)]
    pub bounds: BoundingBox,

    /// Search engine settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Marker clustering settings
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// List and map-marker windows
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Cluster merge animation
    #[serde(default)]
    pub animation: AnimationConfig,

    /// Recent search history
    #[serde(default)]
    pub history: HistoryConfig,

    /// Viewport recommended after a search
    #[serde(default)]
    pub viewport: ViewportOptions,
}

impl ConfigSchema {
    /// Reject settings the engines cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.bounds.is_ordered() {
            return Err(Error::config_invalid("bounds: minimum exceeds maximum"));
        }
        if self.pagination.page_size == 0 {
            return Err(Error::config_invalid("pagination.page_size must be positive"));
        }
        if self.pagination.max_map_markers == 0 {
            return Err(Error::config_invalid("pagination.max_map_markers must be positive"));
        }
        for (name, value) in [
            ("search.expansion_similarity", self.search.expansion_similarity),
            ("search.match_similarity", self.search.match_similarity),
            ("cluster.overlap_threshold", self.cluster.overlap_threshold),
            ("cluster.centroid_ratio", self.cluster.centroid_ratio),
            ("cluster.pair_ratio", self.cluster.pair_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config_invalid(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }
        if self.cluster.marker_size_px <= 0.0 {
            return Err(Error::config_invalid("cluster.marker_size_px must be positive"));
        }
        validate_steps("cluster.radius_steps", &self.cluster.radius_steps)?;
        validate_steps("cluster.km_per_pixel_steps", &self.cluster.km_per_pixel_steps)?;
        if self.viewport.padding_factor < 1.0 || self.viewport.min_delta <= 0.0 {
            return Err(Error::config_invalid("viewport padding must be >= 1 and min_delta positive"));
        }
        Ok(())
    }
}

fn validate_steps(name: &str, steps: &[ZoomStep]) -> Result<()> {
    if steps.windows(2).any(|w| w[0].min_zoom <= w[1].min_zoom) {
        return Err(Error::config_invalid(format!(
            "{}: min_zoom must be strictly decreasing",
            name
        )));
    }
    if steps.iter().any(|s| !(s.value > 0.0)) {
        return Err(Error::config_invalid(format!("{}: values must be positive", name)));
    }
    Ok(())
}

/// Search engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Lifetime of a cached result set
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Cached queries kept before the oldest is evicted
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Similarity at which a keyword-map key expands a query
    #[serde(default = "default_expansion_similarity")]
    pub expansion_similarity: f64,

    /// Similarity at which a name or category matches an expansion term
    #[serde(default = "default_match_similarity")]
    pub match_similarity: f64,

    /// Shortest query for which the length-guarded substring rule applies
    #[serde(default = "default_min_bidirectional_len")]
    pub min_bidirectional_len: usize,
}

impl SearchConfig {
    /// Cache TTL as a `Duration`
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
            expansion_similarity: default_expansion_similarity(),
            match_similarity: default_match_similarity(),
            min_bidirectional_len: default_min_bidirectional_len(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    50
}

fn default_expansion_similarity() -> f64 {
    0.7
}

fn default_match_similarity() -> f64 {
    0.6
}

fn default_min_bidirectional_len() -> usize {
    2
}

/// How phase-one clustering picks among clusters within range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterStrategy {
    /// First cluster in creation order whose centroid is within range
    #[default]
    FirstFit,
    /// Closest cluster within range
    NearestFit,
}

/// One row of a zoom step table: applies from `min_zoom` upward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomStep {
    /// Lowest zoom level this row covers
    pub min_zoom: f64,
    /// Value for this row
    pub value: f64,
}

impl ZoomStep {
    const fn new(min_zoom: f64, value: f64) -> Self {
        Self { min_zoom, value }
    }
}

/// Look up a zoom step table ordered by decreasing `min_zoom`
pub fn lookup_zoom_step(steps: &[ZoomStep], zoom: f64, fallback: f64) -> f64 {
    steps
        .iter()
        .find(|s| zoom >= s.min_zoom)
        .map_or(fallback, |s| s.value)
}

/// Marker clustering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Phase-one assignment strategy
    #[serde(default)]
    pub strategy: ClusterStrategy,

    /// Zoom → cluster radius (km), highest zoom first
    #[serde(default = "default_radius_steps")]
    pub radius_steps: Vec<ZoomStep>,

    /// Radius below the lowest step
    #[serde(default = "default_fallback_radius_km")]
    pub fallback_radius_km: f64,

    /// Zoom → kilometers per screen pixel, highest zoom first
    #[serde(default = "default_km_per_pixel_steps")]
    pub km_per_pixel_steps: Vec<ZoomStep>,

    /// Kilometers per pixel below the lowest step
    #[serde(default = "default_fallback_km_per_pixel")]
    pub fallback_km_per_pixel: f64,

    /// On-screen marker diameter
    #[serde(default = "default_marker_size_px")]
    pub marker_size_px: f64,

    /// Minimum marker overlap ratio for a merge
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: f64,

    /// Maximum centroid distance as a fraction of the marker radius
    #[serde(default = "default_centroid_ratio")]
    pub centroid_ratio: f64,

    /// Fraction of member cross-pairs that must lie within half a marker
    #[serde(default = "default_pair_ratio")]
    pub pair_ratio: f64,

    /// Every member must stay this close to the merged center
    #[serde(default = "default_max_member_offset_m")]
    pub max_member_offset_m: f64,

    /// Clusters one cluster may absorb in the merge pass
    #[serde(default = "default_max_merge_per_cluster")]
    pub max_merge_per_cluster: usize,
}

impl ClusterConfig {
    /// Cluster radius in kilometers for a zoom level
    pub fn radius_km(&self, zoom: f64) -> f64 {
        lookup_zoom_step(&self.radius_steps, zoom, self.fallback_radius_km)
    }

    /// Ground distance covered by one screen pixel at a zoom level
    pub fn km_per_pixel(&self, zoom: f64) -> f64 {
        lookup_zoom_step(&self.km_per_pixel_steps, zoom, self.fallback_km_per_pixel)
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            strategy: ClusterStrategy::default(),
            radius_steps: default_radius_steps(),
            fallback_radius_km: default_fallback_radius_km(),
            km_per_pixel_steps: default_km_per_pixel_steps(),
            fallback_km_per_pixel: default_fallback_km_per_pixel(),
            marker_size_px: default_marker_size_px(),
            overlap_threshold: default_overlap_threshold(),
            centroid_ratio: default_centroid_ratio(),
            pair_ratio: default_pair_ratio(),
            max_member_offset_m: default_max_member_offset_m(),
            max_merge_per_cluster: default_max_merge_per_cluster(),
        }
    }
}

fn default_radius_steps() -> Vec<ZoomStep> {
    vec![
        ZoomStep::new(17.0, 0.02),
        ZoomStep::new(16.0, 0.04),
        ZoomStep::new(15.0, 0.08),
        ZoomStep::new(14.0, 0.15),
        ZoomStep::new(13.0, 0.3),
        ZoomStep::new(12.0, 0.45),
        ZoomStep::new(11.0, 0.6),
        ZoomStep::new(10.0, 0.9),
    ]
}

fn default_fallback_radius_km() -> f64 {
    1.2
}

// Web-mercator ground resolution at mid latitudes, rounded
fn default_km_per_pixel_steps() -> Vec<ZoomStep> {
    vec![
        ZoomStep::new(18.0, 0.0006),
        ZoomStep::new(17.0, 0.0012),
        ZoomStep::new(16.0, 0.0024),
        ZoomStep::new(15.0, 0.0048),
        ZoomStep::new(14.0, 0.0095),
        ZoomStep::new(13.0, 0.019),
        ZoomStep::new(12.0, 0.038),
        ZoomStep::new(11.0, 0.076),
        ZoomStep::new(10.0, 0.153),
    ]
}

fn default_fallback_km_per_pixel() -> f64 {
    0.305
}

fn default_marker_size_px() -> f64 {
    40.0
}

fn default_overlap_threshold() -> f64 {
    0.95
}

fn default_centroid_ratio() -> f64 {
    0.3
}

fn default_pair_ratio() -> f64 {
    0.9
}

fn default_max_member_offset_m() -> f64 {
    5.0
}

fn default_max_merge_per_cluster() -> usize {
    1
}

/// List and map-marker windows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Items added to the list per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Hard cap on markers handed to the map
    #[serde(default = "default_max_map_markers")]
    pub max_map_markers: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_map_markers: default_max_map_markers(),
        }
    }
}

fn default_page_size() -> usize {
    20
}

fn default_max_map_markers() -> usize {
    100
}

/// Cluster merge animation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Length of the merge interpolation
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,

    /// Zoom change below which clusters are not recomputed
    #[serde(default = "default_zoom_threshold")]
    pub zoom_threshold: f64,
}

impl AnimationConfig {
    /// Animation length as a `Duration`
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            zoom_threshold: default_zoom_threshold(),
        }
    }
}

fn default_duration_ms() -> u64 {
    800
}

fn default_zoom_threshold() -> f64 {
    0.05
}

/// Recent search history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Terms remembered, most recent first
    #[serde(default = "default_max_recent_searches")]
    pub max_recent_searches: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_recent_searches: default_max_recent_searches(),
        }
    }
}

fn default_max_recent_searches() -> usize {
    5
}
