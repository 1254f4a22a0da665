//! Bounded infinite-scroll windows over a sorted result set.

use tablemate_core::config::PaginationConfig;
use tablemate_core::Restaurant;

/// Two prefix windows over one sorted result set.
///
/// `visible` grows a page at a time. `map_markers` is the prefix of
/// `visible` capped at `max_map_markers`.
#[derive(Debug, Clone)]
pub struct Paginator {
    items: Vec<Restaurant>,
    visible_len: usize,
    page_size: usize,
    max_markers: usize,
    loading: bool,
}

impl Paginator {
    /// Empty paginator.
    pub fn new(config: &PaginationConfig) -> Self {
        Self {
            items: Vec::new(),
            visible_len: 0,
            page_size: config.page_size.max(1),
            max_markers: config.max_map_markers,
            loading: false,
        }
    }

    /// Replace the result set and reset to the first page.
    pub fn seed(&mut self, items: Vec<Restaurant>) {
        self.visible_len = self.page_size.min(items.len());
        self.items = items;
        self.loading = false;
    }

    /// The whole sorted result set.
    pub fn items(&self) -> &[Restaurant] {
        &self.items
    }

    /// The list window.
    pub fn visible(&self) -> &[Restaurant] {
        &self.items[..self.visible_len]
    }

    /// The map window.
    pub fn map_markers(&self) -> &[Restaurant] {
        &self.items[..self.visible_len.min(self.max_markers)]
    }

    /// True while `visible` is shorter than the result set.
    pub fn has_more(&self) -> bool {
        self.visible_len < self.items.len()
    }

    /// True between `begin_load_more` and `complete_load_more`.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Append the next page. Returns false if loading or exhausted.
    pub fn load_more(&mut self) -> bool {
        if !self.begin_load_more() {
            return false;
        }
        self.complete_load_more();
        true
    }

    /// Mark a page load as started, for callers that fetch asynchronously.
    pub fn begin_load_more(&mut self) -> bool {
        if self.loading || !self.has_more() {
            return false;
        }
        self.loading = true;
        true
    }

    /// Append the next page and clear the loading flag.
    pub fn complete_load_more(&mut self) {
        if self.loading {
            self.visible_len = (self.visible_len + self.page_size).min(self.items.len());
            self.loading = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn records(n: usize) -> Vec<Restaurant> {
        (0..n).map(|i| Restaurant::new(i.to_string(), format!("r{}", i))).collect()
    }

    fn paginator() -> Paginator {
        Paginator::new(&PaginationConfig::default())
    }

    #[test]
    fn test_initial_page() {
        let mut p = paginator();
        p.seed(records(45));
        assert_eq!(p.visible().len(), 20);
        assert_eq!(p.map_markers().len(), 20);
        assert!(p.has_more());
    }

    #[test]
    fn test_short_result_set() {
        let mut p = paginator();
        p.seed(records(7));
        assert_eq!(p.visible().len(), 7);
        assert!(!p.has_more());
        assert!(!p.load_more());
    }

    #[test]
    fn test_load_more_until_exhausted() {
        let mut p = paginator();
        p.seed(records(45));
        assert!(p.load_more());
        assert_eq!(p.visible().len(), 40);
        assert!(p.load_more());
        assert_eq!(p.visible().len(), 45);
        assert!(!p.has_more());
        assert!(!p.load_more());
        assert_eq!(p.visible().len(), 45);
    }

    #[test]
    fn test_markers_capped() {
        let mut p = paginator();
        p.seed(records(250));
        while p.load_more() {}
        assert_eq!(p.visible().len(), 250);
        assert_eq!(p.map_markers().len(), 100);
        assert_eq!(p.map_markers()[99].id, "99");
    }

    #[test]
    fn test_load_more_ignored_while_loading() {
        let mut p = paginator();
        p.seed(records(60));
        assert!(p.begin_load_more());
        assert!(!p.load_more());
        assert_eq!(p.visible().len(), 20);
        p.complete_load_more();
        assert_eq!(p.visible().len(), 40);
        assert!(!p.is_loading());
    }

    #[test]
    fn test_reseed_resets() {
        let mut p = paginator();
        p.seed(records(60));
        p.load_more();
        p.seed(records(30));
        assert_eq!(p.visible().len(), 20);
        assert_eq!(p.items().len(), 30);
    }

    proptest! {
        #[test]
        fn prop_windows_stay_bounded(n in 0usize..400, loads in 0usize..30) {
            let mut p = paginator();
            p.seed(records(n));
            for _ in 0..loads {
                let before = p.visible().len();
                let had_more = p.has_more();
                let loaded = p.load_more();
                prop_assert_eq!(loaded, had_more);
                if !had_more {
                    prop_assert_eq!(p.visible().len(), before);
                }
            }
            prop_assert!(p.map_markers().len() <= 100);
            prop_assert!(p.visible().len() <= n);
            prop_assert_eq!(p.has_more(), p.visible().len() < n);
        }
    }
}
