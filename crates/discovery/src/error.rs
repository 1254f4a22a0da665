//! Error types for the discovery crate.

use thiserror::Error;

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Errors surfaced by the controller's I/O seams.
///
/// Clustering, paging, filtering and sorting never fail.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The data source failed and no offline snapshot was available
    #[error("Restaurant data unavailable: {0}")]
    Source(#[source] tablemate_core::Error),

    /// The persistent store failed
    #[error("Persistent store failed: {0}")]
    Store(#[source] tablemate_core::Error),

    /// Search history could not be persisted
    #[error(transparent)]
    Search(#[from] tablemate_search::SearchError),

    /// Configuration was rejected
    #[error("Invalid configuration: {0}")]
    Config(#[source] tablemate_core::Error),
}
