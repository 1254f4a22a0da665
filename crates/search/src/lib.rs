//! Restaurant search for tablemate.
//!
//! This crate provides:
//! - Levenshtein edit distance and normalized similarity
//! - Query expansion through keyword and food-type tables
//! - A search engine with a TTL result cache
//! - Persistent recent-search history
//!
//! # Example
//!
//! ```
//! use tablemate_core::{config::ConfigSchema, Restaurant};
//! use tablemate_search::SearchEngine;
//!
//! let records = vec![Restaurant::new("1", "교촌치킨"), Restaurant::new("2", "맥도날드")];
//! let mut engine = SearchEngine::new(&ConfigSchema::default());
//!
//! let results = engine.search(&records, "치킨", None);
//! assert_eq!(results.len(), 1);
//! ```

mod engine;
mod error;
mod expand;
mod fuzzy;
mod history;

pub use engine::{ResultSource, SearchEngine, SearchResponse};
pub use error::{Result, SearchError};
pub use expand::{normalize_query, ExpandedQuery, ExpansionRow, ExpansionTables, QueryExpander};
pub use fuzzy::{edit_distance, similarity};
pub use history::{RecentSearches, RECENT_SEARCHES_KEY};
