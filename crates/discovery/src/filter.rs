//! List filters and sort orders applied after search.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tablemate_core::Restaurant;

/// Criteria a restaurant must meet to stay in the list.
///
/// Every criterion that is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryFilter {
    /// Category, compared case-insensitively
    pub category: Option<String>,
    /// Lowest acceptable rating; unrated restaurants fail
    pub min_rating: Option<f64>,
    /// Farthest acceptable distance; restaurants without a distance fail
    pub max_distance_km: Option<f64>,
    /// Price range label, compared case-insensitively
    pub price_range: Option<String>,
}

impl DiscoveryFilter {
    /// True if no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.min_rating.is_none() && self.max_distance_km.is_none() && self.price_range.is_none()
    }

    /// Check `restaurant` against every set criterion.
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        if let Some(category) = &self.category {
            if !same_label(category, &restaurant.category) {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            if !restaurant.rating.is_some_and(|r| r >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_distance_km {
            if !restaurant.distance_km.is_some_and(|d| d <= max) {
                return false;
            }
        }
        if let Some(price) = &self.price_range {
            if !restaurant.price_range.as_deref().is_some_and(|p| same_label(price, p)) {
                return false;
            }
        }
        true
    }

    /// Keep the restaurants that match, preserving order.
    pub fn apply(&self, restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
        if self.is_empty() {
            return restaurants;
        }
        restaurants.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn same_label(wanted: &str, actual: &str) -> bool {
    wanted.trim().to_lowercase() == actual.trim().to_lowercase()
}

/// List ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Search engine order: by distance with an origin, else input order
    #[default]
    Relevance,
    /// Nearest first; unknown distance last
    Distance,
    /// Highest rated first; unrated last
    Rating,
    /// Most reviewed first
    ReviewCount,
    /// Most recommended first
    RecommendCount,
    /// Most recently added first; undated last
    Newest,
}

impl SortOrder {
    /// Sort in place. Ties keep their incoming order.
    pub fn apply(self, restaurants: &mut [Restaurant]) {
        match self {
            Self::Relevance => {}
            Self::Distance => restaurants.sort_by(|a, b| ascending_some_first(a.distance_km, b.distance_km)),
            Self::Rating => restaurants.sort_by(|a, b| descending_some_first(a.rating, b.rating)),
            Self::ReviewCount => restaurants.sort_by(|a, b| b.review_count.cmp(&a.review_count)),
            Self::RecommendCount => restaurants.sort_by(|a, b| b.recommend_count.cmp(&a.recommend_count)),
            Self::Newest => restaurants.sort_by(|a, b| match (a.created_at, b.created_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
        }
    }
}

fn ascending_some_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn descending_some_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
