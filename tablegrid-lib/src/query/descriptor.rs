//! Immutable query descriptor.

use serde::Deserialize;
use serde::Serialize;

use super::FilterRule;
use super::Sort;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Everything that determines which rows are visible.
///
/// Descriptors are values: every `with_*` method returns a new descriptor and
/// leaves `self` untouched. Search and filter changes reset the page to 1, as
/// does a page-size change; sort changes keep the current page.
///
/// `page` and `page_size` are always at least 1. Asking for 0 is a
/// programming error and panics.
///
/// # Example
///
/// ```
/// use tablegrid_lib::query::{QueryDescriptor, Sort};
///
/// let q = QueryDescriptor::new(25)
///     .with_sort(Sort::asc("price"))
///     .with_page(3);
///
/// let resized = q.with_page_size(50);
/// assert_eq!(resized.page(), 1);
/// assert_eq!(q.page(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    search_text: String,
    filters: Vec<FilterRule>,
    sort: Sort,
    page: usize,
    page_size: usize,
}

impl QueryDescriptor {
    /// Creates the mount-time descriptor: page 1, no search, filters or sort.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is 0.
    pub fn new(page_size: usize) -> Self {
        assert!(page_size >= 1, "page size must be at least 1");
        Self {
            search_text: String::new(),
            filters: Vec::new(),
            sort: Sort::none(),
            page: 1,
            page_size,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn filters(&self) -> &[FilterRule] {
        &self.filters
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// 1-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index of the first row of the current page in the matched sequence.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Panics if the descriptor is malformed (deserialized descriptors can
    /// carry zero values).
    pub fn assert_valid(&self) {
        assert!(self.page >= 1, "page must be at least 1, got {}", self.page);
        assert!(
            self.page_size >= 1,
            "page size must be at least 1, got {}",
            self.page_size
        );
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Replaces the search text and returns to page 1.
    pub fn with_search(&self, text: impl Into<String>) -> Self {
        Self {
            search_text: text.into(),
            page: 1,
            ..self.clone()
        }
    }

    /// Replaces all filter rules and returns to page 1.
    pub fn with_filters(&self, filters: Vec<FilterRule>) -> Self {
        Self {
            filters,
            page: 1,
            ..self.clone()
        }
    }

    /// Appends a rule, or replaces the rule with the same id in place.
    pub fn with_filter(&self, rule: FilterRule) -> Self {
        let mut filters = self.filters.clone();
        match filters.iter_mut().find(|f| f.id == rule.id) {
            Some(existing) => *existing = rule,
            None => filters.push(rule),
        }
        self.with_filters(filters)
    }

    /// Removes the rule with `id`. Unknown ids leave the filters unchanged.
    pub fn without_filter(&self, id: &str) -> Self {
        let filters = self.filters.iter().filter(|f| f.id != id).cloned().collect();
        self.with_filters(filters)
    }

    /// Replaces the sort, keeping the page.
    pub fn with_sort(&self, sort: Sort) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    /// Moves to `page`.
    ///
    /// # Panics
    ///
    /// Panics if `page` is 0.
    pub fn with_page(&self, page: usize) -> Self {
        assert!(page >= 1, "page must be at least 1");
        Self {
            page,
            ..self.clone()
        }
    }

    /// Changes the page size and returns to page 1; old offsets are meaningless
    /// under a different slice size.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is 0.
    pub fn with_page_size(&self, page_size: usize) -> Self {
        assert!(page_size >= 1, "page size must be at least 1");
        Self {
            page_size,
            page: 1,
            ..self.clone()
        }
    }
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_page_size_change_resets_page() {
        let q = QueryDescriptor::new(10).with_page(3);
        let resized = q.with_page_size(20);
        assert_eq!(resized.page(), 1);
        assert_eq!(resized.page_size(), 20);
        assert_eq!(q.page(), 3);
    }

    #[test]
    fn test_search_and_filter_reset_page_sort_keeps_it() {
        let q = QueryDescriptor::new(10).with_page(4);
        assert_eq!(q.with_search("lap").page(), 1);
        assert_eq!(q.with_filter(FilterRule::contains("name", "x")).page(), 1);
        assert_eq!(q.with_sort(Sort::desc("price")).page(), 4);
    }

    #[test]
    fn test_with_filter_replaces_by_id() {
        let q = QueryDescriptor::default()
            .with_filter(FilterRule::with_id("a", "name", crate::query::FilterOperator::Contains, "x"))
            .with_filter(FilterRule::with_id("b", "sku", crate::query::FilterOperator::Equals, "1"))
            .with_filter(FilterRule::with_id("a", "name", crate::query::FilterOperator::Contains, "y"));
        let values: Vec<_> = q.filters().iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, ["y", "1"]);

        let q = q.without_filter("a");
        assert_eq!(q.filters().len(), 1);
        assert_eq!(q.filters()[0].id, "b");
    }

    #[test]
    #[should_panic(expected = "page size must be at least 1")]
    fn test_zero_page_size_panics() {
        let _ = QueryDescriptor::default().with_page_size(0);
    }

    #[test]
    #[should_panic(expected = "page must be at least 1")]
    fn test_zero_page_panics() {
        let _ = QueryDescriptor::default().with_page(0);
    }

    #[test]
    fn test_wire_shape() {
        let q = QueryDescriptor::new(2)
            .with_search("lap")
            .with_sort(Sort::asc("price"));
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            json!({
                "searchText": "lap",
                "filters": [],
                "sort": { "field": "price", "direction": "asc" },
                "page": 1,
                "pageSize": 2
            })
        );
    }
}
