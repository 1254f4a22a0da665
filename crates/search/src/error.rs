//! Error types for the search crate.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur around search.
///
/// Searching itself never fails; these come from loading keyword maps and
/// persisting search history.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A keyword map document was structurally wrong
    #[error("Invalid keyword map: {0}")]
    InvalidKeywordMap(String),

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persistent store failed
    #[error(transparent)]
    Store(#[from] tablemate_core::Error),
}
