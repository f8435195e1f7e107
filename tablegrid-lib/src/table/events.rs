//! Table event callbacks.

use std::collections::BTreeSet;

use crate::error::FetchError;
use crate::error::FieldErrors;
use crate::model::Row;
use crate::model::RowId;
use crate::query::ViewResult;

/// Receives notifications from a [`DataTable`](super::DataTable).
///
/// All methods have no-op default implementations, so listeners only
/// implement the events they care about. Callbacks run synchronously inside
/// the table operation that caused them.
pub trait TableListener: Send + Sync {
    /// The view changed: a local evaluation, a fetch started (the view is
    /// flagged loading), a fetch was applied, or a committed edit was merged.
    fn on_view_change(&self, _view: &ViewResult) {}

    /// An edit was committed. Receives the full merged row.
    fn on_row_updated(&self, _row: &Row) {}

    /// The selection changed. Receives every selected id.
    fn on_selection_change(&self, _selected: &BTreeSet<RowId>) {}

    /// The expanded rows changed. Receives every expanded id.
    fn on_expansion_change(&self, _expanded: &BTreeSet<RowId>) {}

    /// A commit failed validation. The edit session is still open.
    fn on_edit_error(&self, _errors: &FieldErrors) {}

    /// The current fetch failed. The last settled view stays visible.
    fn on_fetch_error(&self, _error: &FetchError) {}
}

/// Listener that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl TableListener for NoopListener {}
