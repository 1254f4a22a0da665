//! Recent search terms, most recent first.

use crate::expand::normalize_query;
use crate::Result;
use serde::{Deserialize, Serialize};
use tablemate_core::store::KeyValueStore;

/// Store key under which the history is persisted.
pub const RECENT_SEARCHES_KEY: &str = "recent_searches";

/// A capped, de-duplicated list of recent search terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearches {
    terms: Vec<String>,
    capacity: usize,
}

impl RecentSearches {
    /// Empty history holding at most `capacity` terms.
    pub fn new(capacity: usize) -> Self {
        Self {
            terms: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a term at the front. Returns false for an empty term.
    ///
    /// A term already present moves to the front instead of repeating.
    pub fn record(&mut self, raw: &str) -> bool {
        let term = normalize_query(raw);
        if term.is_empty() || self.capacity == 0 {
            return false;
        }
        self.terms.retain(|t| t != &term);
        self.terms.insert(0, term);
        self.terms.truncate(self.capacity);
        true
    }

    /// Forget one term.
    pub fn remove(&mut self, raw: &str) -> bool {
        let term = normalize_query(raw);
        let before = self.terms.len();
        self.terms.retain(|t| t != &term);
        before != self.terms.len()
    }

    /// Terms, most recent first.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.terms.clear();
    }

    /// Load the history from a store.
    ///
    /// A missing, unreadable or malformed value yields an empty history.
    pub fn load(store: &dyn KeyValueStore, capacity: usize) -> Self {
        let mut history = Self::new(capacity);

        let raw = match store.get(RECENT_SEARCHES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return history,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read recent searches");
                return history;
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(terms) => {
                // oldest first so the stored order survives
                for term in terms.iter().rev() {
                    history.record(term);
                }
            }
            Err(e) => tracing::warn!(error = %e, "Discarding malformed recent searches"),
        }
        history
    }

    /// Persist the history.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(&self.terms)?;
        store.set(RECENT_SEARCHES_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablemate_core::store::MemoryStore;

    #[test]
    fn test_most_recent_first() {
        let mut history = RecentSearches::new(5);
        history.record("치킨");
        history.record("피자");
        assert_eq!(history.terms(), &["피자".to_string(), "치킨".to_string()]);
    }

    #[test]
    fn test_capped_at_capacity() {
        let mut history = RecentSearches::new(5);
        for term in ["a", "b", "c", "d", "e", "f"] {
            history.record(term);
        }
        assert_eq!(history.terms().len(), 5);
        assert_eq!(history.terms()[0], "f");
        assert!(!history.terms().contains(&"a".to_string()));
    }

    #[test]
    fn test_duplicate_moves_to_front() {
        let mut history = RecentSearches::new(5);
        history.record("치킨");
        history.record("피자");
        history.record(" 치킨 ");
        assert_eq!(history.terms(), &["치킨".to_string(), "피자".to_string()]);
    }

    #[test]
    fn test_empty_ignored() {
        let mut history = RecentSearches::new(5);
        assert!(!history.record("   "));
        assert!(history.terms().is_empty());
    }

    #[test]
    fn test_remove() {
        let mut history = RecentSearches::new(5);
        history.record("치킨");
        assert!(history.remove("치킨"));
        assert!(!history.remove("치킨"));
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let mut history = RecentSearches::new(5);
        history.record("국밥");
        history.record("족발");
        history.save(&mut store).unwrap();

        let loaded = RecentSearches::load(&store, 5);
        assert_eq!(loaded, history);
    }

    #[test]
    fn test_load_truncates_to_capacity() {
        let mut store = MemoryStore::new();
        store.set(RECENT_SEARCHES_KEY, r#"["a","b","c","d"]"#).unwrap();
        let loaded = RecentSearches::load(&store, 2);
        assert_eq!(loaded.terms(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_corrupt_value_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(RECENT_SEARCHES_KEY, "{not json").unwrap();
        assert!(RecentSearches::load(&store, 5).terms().is_empty());
    }
}
