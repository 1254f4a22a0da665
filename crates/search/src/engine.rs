//! Restaurant search over an in-memory collection.
//!
//! A restaurant matches when any expansion term is a substring of its name,
//! category or address, or when the best similarity between its name or
//! category and any term reaches the match threshold. Both tiers count the
//! same; there is no ranking between them. With an origin, matches carry
//! their distance and are sorted closest first.
//!
//! Results are cached per normalized query for a fixed TTL. A cache hit is
//! returned verbatim, including distances computed for the origin that was
//! current when the entry was stored.

use crate::expand::{normalize_query, ExpandedQuery, QueryExpander};
use crate::fuzzy::similarity;
use std::time::Instant;
use tablemate_core::cache::{CacheConfig, CacheStats, TtlCache};
use tablemate_core::config::ConfigSchema;
use tablemate_core::Restaurant;
use tablemate_geo::{calculate_distances, BoundingBox, Coordinate};

/// Where a result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Empty query: every record, distance-sorted when an origin is known
    Browse,
    /// Served from the TTL cache
    Cache,
    /// Freshly matched against the collection
    Computed,
}

/// A search result set together with how it was produced.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    /// Matching records, copies carrying `distance_km` when an origin was given
    pub results: Vec<Restaurant>,
    /// Browse, cache hit or fresh computation
    pub source: ResultSource,
    /// Expansion used for a fresh computation
    pub expanded: Option<ExpandedQuery>,
}

/// Filters and orders restaurants against expanded queries.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    expander: QueryExpander,
    cache: TtlCache<String, Vec<Restaurant>>,
    bounds: BoundingBox,
    match_similarity: f64,
}

impl SearchEngine {
    /// Engine over the built-in expansion tables.
    pub fn new(config: &ConfigSchema) -> Self {
        Self::with_expander(QueryExpander::new(&config.search), config)
    }

    /// Engine over a custom expander.
    pub fn with_expander(expander: QueryExpander, config: &ConfigSchema) -> Self {
        Self {
            expander,
            cache: TtlCache::new(CacheConfig::new(
                config.search.cache_ttl(),
                config.search.cache_max_entries,
            )),
            bounds: config.bounds,
            match_similarity: config.search.match_similarity,
        }
    }

    /// The expander used for queries.
    pub fn expander(&self) -> &QueryExpander {
        &self.expander
    }

    /// Search `restaurants` for `raw_query`.
    pub fn search(
        &mut self,
        restaurants: &[Restaurant],
        raw_query: &str,
        origin: Option<Coordinate>,
    ) -> Vec<Restaurant> {
        self.search_at(restaurants, raw_query, origin, Instant::now()).results
    }

    /// Search with an explicit clock, reporting where the results came from.
    pub fn search_at(
        &mut self,
        restaurants: &[Restaurant],
        raw_query: &str,
        origin: Option<Coordinate>,
        now: Instant,
    ) -> SearchResponse {
        let query = normalize_query(raw_query);

        if query.is_empty() {
            let results = match origin {
                Some(origin) => self.sort_by_distance(restaurants.to_vec(), &origin),
                None => restaurants.to_vec(),
            };
            return SearchResponse {
                results,
                source: ResultSource::Browse,
                expanded: None,
            };
        }

        if let Some(cached) = self.cache.get_at(query.as_str(), now) {
            tracing::debug!(query = %query, results = cached.len(), "Search cache hit");
            return SearchResponse {
                results: cached.clone(),
                source: ResultSource::Cache,
                expanded: None,
            };
        }

        let expanded = self.expander.expand(&query);
        let matches = self.matching(restaurants, &expanded);
        let results = match origin {
            Some(origin) => self.sort_by_distance(matches, &origin),
            None => matches,
        };

        tracing::debug!(
            query = %query,
            terms = expanded.len(),
            candidates = restaurants.len(),
            results = results.len(),
            "Search computed"
        );

        self.cache.insert_at(query, results.clone(), now);

        SearchResponse {
            results,
            source: ResultSource::Computed,
            expanded: Some(expanded),
        }
    }

    /// Whether a single record matches an expansion.
    pub fn is_match(&self, restaurant: &Restaurant, expanded: &ExpandedQuery) -> bool {
        let name = restaurant.name.to_lowercase();
        let category = restaurant.category.to_lowercase();
        let address = restaurant.address.to_lowercase();

        let exact = expanded
            .terms()
            .any(|t| name.contains(t) || category.contains(t) || address.contains(t));
        if exact {
            return true;
        }

        let best = expanded
            .terms()
            .map(|t| similarity(&name, t).max(similarity(&category, t)))
            .fold(0.0_f64, f64::max);
        best >= self.match_similarity
    }

    /// Drop every cached result set.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Cache hit/miss counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn matching(&self, restaurants: &[Restaurant], expanded: &ExpandedQuery) -> Vec<Restaurant> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            restaurants
                .par_iter()
                .filter(|r| self.is_match(r, expanded))
                .cloned()
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            restaurants
                .iter()
                .filter(|r| self.is_match(r, expanded))
                .cloned()
                .collect()
        }
    }

    /// Attach distances and stable-sort closest first; unknown positions last.
    fn sort_by_distance(&self, records: Vec<Restaurant>, origin: &Coordinate) -> Vec<Restaurant> {
        let positions: Vec<Option<Coordinate>> =
            records.iter().map(|r| r.coordinate(&self.bounds)).collect();
        let mut distances = calculate_distances(origin, &positions);
        distances.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        distances
            .into_iter()
            .map(|d| records[d.index].with_distance(d.known()))
            .collect()
    }
}
