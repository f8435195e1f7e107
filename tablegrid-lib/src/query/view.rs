//! The current view of a table.

use serde::Deserialize;
use serde::Serialize;

use crate::model::Row;
use crate::model::RowId;

/// The rows and count the view layer renders.
///
/// Derived by the local evaluator or the remote bridge; never edited by hand.
/// `rows` holds at most one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResult {
    rows: Vec<Row>,
    total_matched: usize,
    is_loading: bool,
}

impl ViewResult {
    /// Creates a settled view.
    pub fn new(rows: Vec<Row>, total_matched: usize) -> Self {
        Self {
            rows,
            total_matched,
            is_loading: false,
        }
    }

    /// Returns the same rows flagged as loading.
    pub fn loading(mut self) -> Self {
        self.is_loading = true;
        self
    }

    /// Returns the same rows flagged as settled.
    pub fn settled(mut self) -> Self {
        self.is_loading = false;
        self
    }

    /// Returns the rows in this page.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consumes the view and returns the rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows matching search and filters, across all pages.
    pub fn total_matched(&self) -> usize {
        self.total_matched
    }

    /// Returns `true` while a remote fetch for the current descriptor is pending.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ids of the rows in this page, in display order.
    pub fn ids(&self, id_field: &str) -> Vec<RowId> {
        self.rows.iter().filter_map(|row| row.id(id_field)).collect()
    }

    /// Number of pages needed to show every matched row.
    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.total_matched.div_ceil(page_size)
    }
}
