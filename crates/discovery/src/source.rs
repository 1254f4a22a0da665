//! Data-source collaborator and the offline snapshot that backs it up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tablemate_core::store::KeyValueStore;
use tablemate_core::{Error, Restaurant, Result};

/// Store key for the last successful fetch.
pub const SNAPSHOT_KEY: &str = "restaurant_snapshot";

/// Supplies restaurant records.
pub trait RestaurantSource {
    /// Fetch the full restaurant list.
    fn fetch(&self) -> Result<Vec<Restaurant>>;
}

impl<F> RestaurantSource for F
where
    F: Fn() -> Result<Vec<Restaurant>>,
{
    fn fetch(&self) -> Result<Vec<Restaurant>> {
        self()
    }
}

/// Reads a JSON array of restaurants from a file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Source backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RestaurantSource for JsonFileSource {
    fn fetch(&self) -> Result<Vec<Restaurant>> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::data_unavailable(format!("Cannot read {}", self.path.display())).with_source(e))?;
        let restaurants: Vec<Restaurant> = serde_json::from_str(&content).map_err(|e| {
            Error::data_source(format!("Malformed restaurant file {}", self.path.display())).with_source(e)
        })?;
        tracing::debug!(path = %self.path.display(), count = restaurants.len(), "Loaded restaurants");
        Ok(restaurants)
    }
}

/// Where the controller's current records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "origin")]
pub enum DataOrigin {
    /// A fresh fetch
    Network,
    /// The offline snapshot, because the fetch failed
    Snapshot {
        /// When the snapshot was taken
        saved_at: DateTime<Utc>,
    },
}

/// The last successful fetch, kept for offline use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineSnapshot {
    /// When the fetch completed
    pub saved_at: DateTime<Utc>,
    /// Records as fetched
    pub restaurants: Vec<Restaurant>,
}

impl OfflineSnapshot {
    /// Snapshot of `restaurants` taken now.
    pub fn new(restaurants: Vec<Restaurant>) -> Self {
        Self {
            saved_at: Utc::now(),
            restaurants,
        }
    }

    /// Write under [`SNAPSHOT_KEY`].
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self)?;
        store.set(SNAPSHOT_KEY, &json)
    }

    /// Read the stored snapshot.
    ///
    /// A missing or unreadable snapshot is `Ok(None)`; only store failures
    /// are errors.
    pub fn load(store: &dyn KeyValueStore) -> Result<Option<Self>> {
        let Some(json) = store.get(SNAPSHOT_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable restaurant snapshot");
                Ok(None)
            }
        }
    }
}
