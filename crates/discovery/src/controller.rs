//! Composition root for the map/list discovery view.
//!
//! Every change to the query, origin, filter, sort order, map area or data
//! runs the same pipeline: search, area restriction, filter, sort, paginator
//! re-seed, then clustering of the map markers at the current zoom. Zoom
//! changes only recluster, and only when the change is significant and no
//! cluster animation is in flight.

use crate::animation::AnimationGuard;
use crate::cluster::{diff_clusters, Cluster, ClusterEngine, ClusterTransition};
use crate::error::{DiscoveryError, Result};
use crate::filter::{DiscoveryFilter, SortOrder};
use crate::paginator::Paginator;
use crate::source::{DataOrigin, OfflineSnapshot, RestaurantSource};
use std::time::Instant;
use tablemate_core::config::ConfigSchema;
use tablemate_core::store::KeyValueStore;
use tablemate_core::Restaurant;
use tablemate_geo::{fit_coordinates, Coordinate, MapRegion};
use tablemate_search::{normalize_query, RecentSearches, ResultSource, SearchEngine};
use tablemate_telemetry::{metrics, Timer};

/// Zoom level assumed before the map reports a region.
pub const DEFAULT_ZOOM_LEVEL: f64 = 14.0;

/// What a settled map region did to the clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionOutcome {
    /// Zoom moved less than the threshold
    Unchanged,
    /// Dropped because a cluster animation is in flight
    Suppressed,
    /// Clusters rebuilt and the animation window opened
    Reclustered {
        /// Some cluster is tagged as a merge and interpolates
        animated: bool,
    },
}

/// Drives search, paging and clustering for the UI layer.
#[derive(Debug)]
pub struct DiscoveryController {
    config: ConfigSchema,
    search: SearchEngine,
    clusterer: ClusterEngine,
    paginator: Paginator,
    guard: AnimationGuard,
    history: RecentSearches,

    restaurants: Vec<Restaurant>,
    data_origin: Option<DataOrigin>,
    query: String,
    origin: Option<Coordinate>,
    filter: DiscoveryFilter,
    sort: SortOrder,
    area: Option<MapRegion>,

    zoom: f64,
    viewport: Option<MapRegion>,
    transitions: Vec<ClusterTransition>,
}

impl DiscoveryController {
    /// Controller over `config`, with no data loaded.
    pub fn new(config: ConfigSchema) -> Result<Self> {
        config.validate().map_err(DiscoveryError::Config)?;
        let search = SearchEngine::new(&config);
        Ok(Self::with_search_engine(config, search))
    }

    /// Controller using a prepared search engine, e.g. one with custom
    /// expansion tables.
    pub fn with_search_engine(config: ConfigSchema, search: SearchEngine) -> Self {
        Self {
            clusterer: ClusterEngine::new(config.cluster.clone(), config.bounds),
            paginator: Paginator::new(&config.pagination),
            history: RecentSearches::new(config.history.max_recent_searches),
            guard: AnimationGuard::default(),
            search,
            restaurants: Vec::new(),
            data_origin: None,
            query: String::new(),
            origin: None,
            filter: DiscoveryFilter::default(),
            sort: SortOrder::default(),
            area: None,
            zoom: DEFAULT_ZOOM_LEVEL,
            viewport: None,
            transitions: Vec::new(),
            config,
        }
    }

    /// Replace the restaurant collection.
    pub fn load(&mut self, restaurants: Vec<Restaurant>) {
        tracing::info!(count = restaurants.len(), "Restaurants loaded");
        self.restaurants = restaurants;
        self.search.clear_cache();
        self.refresh_results();
    }

    /// Fetch from `source`, falling back to the offline snapshot.
    ///
    /// A successful fetch is saved as the new snapshot. Fails only when the
    /// fetch fails and no snapshot exists.
    pub fn refresh(&mut self, source: &dyn RestaurantSource, store: &mut dyn KeyValueStore) -> Result<DataOrigin> {
        let data_origin = match source.fetch() {
            Ok(restaurants) => {
                let snapshot = OfflineSnapshot::new(restaurants);
                if let Err(e) = snapshot.save(store) {
                    tracing::warn!(error = %e, "Failed to save restaurant snapshot");
                }
                self.load(snapshot.restaurants);
                DataOrigin::Network
            }
            Err(fetch_error) => {
                let snapshot = OfflineSnapshot::load(store).map_err(DiscoveryError::Store)?;
                let Some(snapshot) = snapshot else {
                    return Err(DiscoveryError::Source(fetch_error));
                };
                tracing::warn!(
                    error = %fetch_error,
                    saved_at = %snapshot.saved_at,
                    "Fetch failed, using offline snapshot"
                );
                let saved_at = snapshot.saved_at;
                self.load(snapshot.restaurants);
                DataOrigin::Snapshot { saved_at }
            }
        };
        self.data_origin = Some(data_origin);
        Ok(data_origin)
    }

    /// Run a search. Non-empty queries are added to the recent searches.
    pub fn set_query(&mut self, raw: &str) {
        self.query = raw.to_string();
        self.history.record(raw);
        self.refresh_results();
    }

    /// Set or clear the user's position.
    ///
    /// Cached results carry distances from the previous origin, so a new
    /// origin empties the search cache.
    pub fn set_origin(&mut self, origin: Option<Coordinate>) {
        if origin != self.origin {
            self.origin = origin;
            self.search.clear_cache();
            self.refresh_results();
        }
    }

    /// Replace the list filter.
    pub fn set_filter(&mut self, filter: DiscoveryFilter) {
        self.filter = filter;
        self.refresh_results();
    }

    /// Replace the sort order.
    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.refresh_results();
    }

    /// Restrict results to restaurants inside `region`.
    pub fn search_area(&mut self, region: MapRegion) {
        self.area = Some(region);
        self.refresh_results();
    }

    /// Lift the map-area restriction.
    pub fn clear_area(&mut self) {
        if self.area.take().is_some() {
            self.refresh_results();
        }
    }

    /// The map stopped moving.
    pub fn on_region_settled(&mut self, region: MapRegion, now: Instant) -> RegionOutcome {
        let zoom = region.zoom_level();
        if (zoom - self.zoom).abs() <= self.config.animation.zoom_threshold {
            return RegionOutcome::Unchanged;
        }
        if self.guard.poll(now) {
            tracing::debug!(zoom, "Zoom change dropped during cluster animation");
            return RegionOutcome::Suppressed;
        }

        self.zoom = zoom;
        self.rebuild_clusters();

        self.guard.try_begin(now, self.config.animation.duration());
        let animated = self.transitions.iter().any(ClusterTransition::is_animated);
        RegionOutcome::Reclustered { animated }
    }

    /// The animation timer fired.
    pub fn on_animation_timer(&mut self) {
        self.guard.timer_fired();
    }

    /// Show the next page. Returns false if nothing was added.
    pub fn load_more(&mut self) -> bool {
        let markers = self.paginator.map_markers().len();
        if !self.paginator.load_more() {
            return false;
        }
        if self.paginator.map_markers().len() != markers {
            self.rebuild_clusters();
        }
        true
    }

    /// Load recent searches from `store`, replacing the in-memory list.
    pub fn load_history(&mut self, store: &dyn KeyValueStore) {
        self.history = RecentSearches::load(store, self.config.history.max_recent_searches);
    }

    /// Persist recent searches to `store`.
    pub fn save_history(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        self.history.save(store)?;
        Ok(())
    }

    pub fn visible(&self) -> &[Restaurant] {
        self.paginator.visible()
    }

    pub fn map_markers(&self) -> &[Restaurant] {
        self.paginator.map_markers()
    }

    /// Every result after filtering and sorting, not just the visible page.
    pub fn results(&self) -> &[Restaurant] {
        self.paginator.items()
    }

    pub fn has_more(&self) -> bool {
        self.paginator.has_more()
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.transitions.iter().map(|t| &t.cluster)
    }

    pub fn transitions(&self) -> &[ClusterTransition] {
        &self.transitions
    }

    /// Marker positions at `now`, interpolated while a merge animates.
    pub fn animated_positions(&self, now: Instant) -> Vec<Coordinate> {
        let duration = self.config.animation.duration();
        let elapsed = self.guard.elapsed(now).unwrap_or(duration);
        self.transitions.iter().map(|t| t.position_at(elapsed, duration)).collect()
    }

    pub fn is_animating(&self) -> bool {
        !self.guard.is_idle()
    }

    /// Recommended map region after the last search.
    pub fn viewport(&self) -> Option<&MapRegion> {
        self.viewport.as_ref()
    }

    pub fn recent_searches(&self) -> &[String] {
        self.history.terms()
    }

    pub fn data_origin(&self) -> Option<DataOrigin> {
        self.data_origin
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn config(&self) -> &ConfigSchema {
        &self.config
    }

    fn refresh_results(&mut self) {
        let timer = Timer::start("discovery.search");
        let response = self.search.search_at(&self.restaurants, &self.query, self.origin, Instant::now());
        timer.stop();

        match response.source {
            ResultSource::Cache => metrics().increment("discovery.search.cache_hit"),
            ResultSource::Computed => metrics().increment("discovery.search.cache_miss"),
            ResultSource::Browse => {}
        }

        let mut results = response.results;
        if let Some(area) = &self.area {
            let area = area.bounds();
            let national = &self.config.bounds;
            results.retain(|r| r.coordinate(national).is_some_and(|c| area.contains(&c)));
        }
        let mut results = self.filter.apply(results);
        self.sort.apply(&mut results);

        self.viewport = if normalize_query(&self.query).is_empty() {
            None
        } else {
            let positions: Vec<Coordinate> = results.iter().filter_map(|r| r.coordinate(&self.config.bounds)).collect();
            fit_coordinates(&positions, &self.config.viewport)
        };

        tracing::debug!(
            query = %self.query,
            results = results.len(),
            source = ?response.source,
            "Results refreshed"
        );
        self.paginator.seed(results);
        self.rebuild_clusters();
    }

    fn rebuild_clusters(&mut self) {
        let _timer = Timer::start("discovery.cluster");
        let previous: Vec<Cluster> = std::mem::take(&mut self.transitions)
            .into_iter()
            .map(|t| t.cluster)
            .collect();
        let current = self.clusterer.cluster(self.paginator.map_markers(), self.zoom);
        self.transitions = diff_clusters(&previous, current, self.clusterer.radius_km(self.zoom));
        metrics().gauge("discovery.clusters", self.transitions.len() as u64);
    }
}
