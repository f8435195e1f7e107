//! The table facade.
//!
//! [`DataTable`] ties the pieces together: it owns the canonical rows, the
//! column registry, the mode controller, the edit session and the
//! selection/expansion sets, and reports changes to a [`TableListener`].
//!
//! Operations that change the descriptor return a [`Dispatch`]. A local
//! dispatch is already reflected in [`DataTable::view`]; a remote one carries
//! a [`PendingFetch`](crate::remote::PendingFetch) the caller runs and hands
//! back through [`DataTable::complete_fetch`].

mod events;

pub use events::*;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::columns::ColumnRegistry;
use crate::config::TableConfig;
use crate::controller::Dispatch;
use crate::controller::FetchStatus;
use crate::controller::Mode;
use crate::controller::ModeController;
use crate::edit::EditSession;
use crate::edit::EditSessionManager;
use crate::error::ColumnError;
use crate::error::EditError;
use crate::error::FetchError;
use crate::error::TableError;
use crate::eval::matching_ids;
use crate::model::ColumnDefinition;
use crate::model::Dataset;
use crate::model::Row;
use crate::model::RowId;
use crate::model::Value;
use crate::query::FilterRule;
use crate::query::QueryDescriptor;
use crate::query::Sort;
use crate::query::ViewResult;
use crate::remote::FetchCompletion;
use crate::remote::RemoteSource;
use crate::selection::RowSet;
use crate::selection::SelectAllScope;

/// A data table instance.
///
/// # Example
///
/// ```
/// use tablegrid_lib::config::TableConfig;
/// use tablegrid_lib::model::{ColumnDefinition, ColumnType, Row};
/// use tablegrid_lib::query::Sort;
/// use tablegrid_lib::table::DataTable;
///
/// let rows = vec![
///     Row::new().set("id", "a").set("price", 2499.99),
///     Row::new().set("id", "b").set("price", 599.99),
///     Row::new().set("id", "c").set("price", 799.99),
/// ];
/// let columns = vec![
///     ColumnDefinition::new("id", ColumnType::Text),
///     ColumnDefinition::new("price", ColumnType::Number).sortable(),
/// ];
///
/// let mut table = DataTable::new(TableConfig::default().with_page_size(2), columns, rows)?;
/// let _ = table.mount();
/// let _ = table.set_sort(Sort::asc("price"));
///
/// assert_eq!(table.view().len(), 2);
/// assert_eq!(table.view().total_matched(), 3);
/// # Ok::<(), tablegrid_lib::error::TableError>(())
/// ```
pub struct DataTable {
    config: TableConfig,
    columns: ColumnRegistry,
    /// Canonical rows in local mode.
    local: Dataset,
    /// Rows of the last applied remote page.
    remote: Dataset,
    controller: ModeController,
    edits: EditSessionManager,
    selection: RowSet,
    expansion: RowSet,
    listener: Box<dyn TableListener>,
}

impl DataTable {
    /// Creates a table. Nothing is evaluated until [`mount`](Self::mount).
    pub fn new(config: TableConfig, columns: Vec<ColumnDefinition>, rows: Vec<Row>) -> Result<Self, TableError> {
        let columns = ColumnRegistry::new(columns)?.with_controls(config.controls);
        let local = Dataset::new(config.id_field.clone(), rows)?;
        let controller = ModeController::new(
            config.mode,
            QueryDescriptor::new(config.page_size),
            config.id_field.clone(),
        )
        .with_escalation(config.escalation);

        Ok(Self {
            remote: Dataset::empty(config.id_field.clone()),
            selection: RowSet::with_mode(config.selection_mode),
            expansion: RowSet::new(),
            listener: Box::new(NoopListener),
            edits: EditSessionManager::new(),
            columns,
            local,
            controller,
            config,
        })
    }

    /// Attaches the remote source used in remote mode and for escalation.
    pub fn with_source(mut self, source: Arc<dyn RemoteSource>) -> Self {
        self.controller = self.controller.with_source(source);
        self
    }

    pub fn with_listener(mut self, listener: impl TableListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    /// Runs the first evaluation with the default descriptor.
    pub fn mount(&mut self) -> Dispatch {
        log::debug!("[table] mount in {:?} mode", self.controller.mode());
        self.refresh()
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewResult {
        self.controller.view()
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        self.controller.descriptor()
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn is_loading(&self) -> bool {
        self.controller.is_loading()
    }

    /// Error of the latest fetch, if it failed.
    pub fn last_error(&self) -> Option<&FetchError> {
        self.controller.last_error()
    }

    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    /// The dataset edits and selection reads go through: the full local
    /// dataset in local mode, the last applied page in remote mode.
    pub fn dataset(&self) -> &Dataset {
        match self.controller.mode() {
            Mode::Local => &self.local,
            Mode::Remote => &self.remote,
        }
    }

    /// Number of pages for the current match count.
    pub fn page_count(&self) -> usize {
        self.view().page_count(self.descriptor().page_size())
    }

    // =========================================================================
    // Dataset and columns
    // =========================================================================

    /// Replaces the local rows and re-evaluates in local mode.
    ///
    /// An open edit session is kept; committing it fails if its row is gone.
    pub fn set_rows(&mut self, rows: Vec<Row>) -> Result<Dispatch, TableError> {
        self.local.replace_rows(rows)?;
        log::debug!("[table] dataset replaced ({} rows)", self.local.len());
        if self.controller.mode() == Mode::Local {
            Ok(self.refresh())
        } else {
            Ok(Dispatch::Local)
        }
    }

    /// Replaces the column registry wholesale.
    ///
    /// Visibility and freeze state reset, and an active edit is cancelled.
    pub fn set_columns(&mut self, columns: Vec<ColumnDefinition>) -> Result<Dispatch, TableError> {
        self.columns = ColumnRegistry::new(columns)?.with_controls(self.config.controls);
        if self.edits.cancel().is_some() {
            log::debug!("[table] column reset cancelled the active edit");
        }
        Ok(self.refresh())
    }

    /// Shows or hides a column.
    pub fn set_column_visibility(&mut self, field: &str, visible: bool) -> Result<(), TableError> {
        self.columns = self.columns.with_visibility(field, visible)?;
        Ok(())
    }

    /// Flips a column's visibility.
    pub fn toggle_column(&mut self, field: &str) -> Result<(), TableError> {
        self.columns = self.columns.with_toggled(field)?;
        Ok(())
    }

    /// Pins the first `n` visible columns; `n` is clamped to the visible count.
    pub fn set_freeze_count(&mut self, n: usize) {
        self.columns = self.columns.with_freeze_count(n);
    }

    // =========================================================================
    // Query
    // =========================================================================

    /// Submits an arbitrary descriptor.
    pub fn submit(&mut self, descriptor: QueryDescriptor) -> Dispatch {
        let dispatch = self.controller.submit(descriptor, self.local.rows(), &self.columns);
        self.dispatched(dispatch)
    }

    /// Submits a descriptor that needs a server, escalating a local table to
    /// remote mode when the escalation policy allows it.
    pub fn submit_to_server(&mut self, descriptor: QueryDescriptor) -> Dispatch {
        let dispatch = self
            .controller
            .submit_requiring_server(descriptor, self.local.rows(), &self.columns);
        self.dispatched(dispatch)
    }

    /// Sets the search text and returns to page 1.
    pub fn set_search(&mut self, text: impl Into<String>) -> Dispatch {
        let next = self.descriptor().with_search(text);
        self.submit(next)
    }

    /// Adds a filter, or replaces the filter with the same id.
    pub fn add_filter(&mut self, rule: FilterRule) -> Result<Dispatch, TableError> {
        self.check_column(&rule.field)?;
        let next = self.descriptor().with_filter(rule);
        Ok(self.submit(next))
    }

    /// Removes the filter with `id`.
    pub fn remove_filter(&mut self, id: &str) -> Dispatch {
        let next = self.descriptor().without_filter(id);
        self.submit(next)
    }

    /// Replaces every filter.
    pub fn set_filters(&mut self, rules: Vec<FilterRule>) -> Result<Dispatch, TableError> {
        for rule in &rules {
            self.check_column(&rule.field)?;
        }
        let next = self.descriptor().with_filters(rules);
        Ok(self.submit(next))
    }

    pub fn clear_filters(&mut self) -> Dispatch {
        let next = self.descriptor().with_filters(Vec::new());
        self.submit(next)
    }

    pub fn set_sort(&mut self, sort: Sort) -> Dispatch {
        let next = self.descriptor().with_sort(sort);
        self.submit(next)
    }

    /// Cycles the sort on `field`: asc, desc, none.
    pub fn toggle_sort(&mut self, field: &str) -> Result<Dispatch, TableError> {
        let column = self
            .columns
            .get(field)
            .ok_or_else(|| ColumnError::UnknownColumn(field.to_string()))?;
        if !column.is_sortable() {
            return Err(ColumnError::NotSortable(field.to_string()).into());
        }
        let sort = self.descriptor().sort().toggled(field);
        Ok(self.set_sort(sort))
    }

    /// Moves to `page` (1-based).
    ///
    /// # Panics
    ///
    /// Panics if `page` is 0.
    pub fn set_page(&mut self, page: usize) -> Dispatch {
        let next = self.descriptor().with_page(page);
        self.submit(next)
    }

    /// Changes the page size and returns to page 1.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is 0.
    pub fn set_page_size(&mut self, page_size: usize) -> Dispatch {
        let next = self.descriptor().with_page_size(page_size);
        self.submit(next)
    }

    /// Switches mode explicitly and re-evaluates the current descriptor.
    pub fn set_mode(&mut self, mode: Mode) -> Result<Dispatch, TableError> {
        let dispatch = self.controller.set_mode(mode, self.local.rows(), &self.columns)?;
        Ok(self.dispatched(dispatch))
    }

    /// Re-evaluates the current descriptor.
    pub fn refresh(&mut self) -> Dispatch {
        let dispatch = self.controller.refresh(self.local.rows(), &self.columns);
        self.dispatched(dispatch)
    }

    /// Resubmits the current descriptor after a failed fetch.
    pub fn retry(&mut self) -> Dispatch {
        if let Some(e) = self.controller.last_error() {
            log::debug!("[table] retrying after: {}", e);
        }
        self.refresh()
    }

    /// Hands a finished fetch back to the table.
    ///
    /// Stale completions return [`FetchStatus::Discarded`] and change nothing.
    pub fn complete_fetch(&mut self, completion: FetchCompletion) -> Result<FetchStatus, TableError> {
        match self.controller.complete(completion) {
            Ok(FetchStatus::Applied(page)) => {
                self.remote = page.clone();
                self.listener.on_view_change(self.controller.view());
                Ok(FetchStatus::Applied(page))
            }
            Ok(FetchStatus::Discarded) => Ok(FetchStatus::Discarded),
            Err(e) => {
                self.listener.on_fetch_error(&e);
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Opens an edit session for `id`.
    pub fn start_edit(&mut self, id: &RowId) -> Result<&EditSession, TableError> {
        let dataset = match self.controller.mode() {
            Mode::Local => &self.local,
            Mode::Remote => &self.remote,
        };
        Ok(self.edits.start(id, dataset)?)
    }

    /// Buffers a value for an editable field of the row being edited.
    pub fn set_field(&mut self, field: &str, value: impl Into<Value>) -> Result<(), TableError> {
        Ok(self
            .edits
            .set_field(field, value, &self.columns, &self.config.id_field)?)
    }

    /// Validates and merges the active edit into the canonical row.
    ///
    /// On success `on_row_updated` fires once with the merged row. A
    /// validation failure fires `on_edit_error` and keeps the session open.
    pub fn commit_edit(&mut self) -> Result<Row, TableError> {
        let dataset = match self.controller.mode() {
            Mode::Local => &mut self.local,
            Mode::Remote => &mut self.remote,
        };
        let row = match self.edits.commit(dataset, &self.columns) {
            Ok(row) => row,
            Err(EditError::ValidationFailed(errors)) => {
                self.listener.on_edit_error(&errors);
                return Err(EditError::ValidationFailed(errors).into());
            }
            Err(e) => return Err(e.into()),
        };

        self.listener.on_row_updated(&row);
        match self.controller.mode() {
            Mode::Local => {
                // The edit may move the row in or out of the current page
                let _ = self.refresh();
            }
            Mode::Remote => {
                if let Some(id) = row.id(&self.config.id_field) {
                    self.controller.patch_view_row(&id, &row);
                }
                self.listener.on_view_change(self.controller.view());
            }
        }
        Ok(row)
    }

    /// Discards the active edit. Returns `false` if nothing was being edited.
    pub fn cancel_edit(&mut self) -> bool {
        self.edits.cancel().is_some()
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edits.session()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn select(&mut self, id: &RowId) -> bool {
        let changed = self.selection.select(id);
        self.selection_changed(changed)
    }

    pub fn deselect(&mut self, id: &RowId) -> bool {
        let changed = self.selection.deselect(id);
        self.selection_changed(changed)
    }

    pub fn toggle_selection(&mut self, id: &RowId) -> bool {
        let changed = self.selection.toggle(id);
        self.selection_changed(changed)
    }

    /// Selects from the last anchor to `target` in current page order.
    pub fn select_range(&mut self, target: &RowId, extend: bool) -> bool {
        let ordered = self.view().ids(&self.config.id_field);
        let (added, removed) = self.selection.range_select(target, &ordered, extend);
        self.selection_changed(!added.is_empty() || !removed.is_empty())
    }

    /// Selects every row in `scope`.
    ///
    /// In remote mode only the current page is known, so
    /// [`SelectAllScope::AllMatched`] covers the current page.
    pub fn select_all(&mut self, scope: SelectAllScope) -> bool {
        let ids = match (scope, self.controller.mode()) {
            (SelectAllScope::AllMatched, Mode::Local) => matching_ids(
                self.local.rows(),
                &self.config.id_field,
                &self.columns,
                self.controller.descriptor(),
            ),
            (SelectAllScope::AllMatched, Mode::Remote) => {
                log::debug!("[table] select all matched in remote mode covers the current page only");
                self.view().ids(&self.config.id_field)
            }
            (SelectAllScope::CurrentPage, _) => self.view().ids(&self.config.id_field),
        };
        let added = self.selection.select_all(&ids);
        self.selection_changed(!added.is_empty())
    }

    pub fn clear_selection(&mut self) -> bool {
        let removed = self.selection.clear();
        self.selection_changed(!removed.is_empty())
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selection.contains(id) && self.is_live(id)
    }

    /// Selected ids that still exist.
    pub fn selected_ids(&self) -> BTreeSet<RowId> {
        self.selection.live_ids(|id| self.is_live(id))
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    pub fn expand(&mut self, id: &RowId) -> bool {
        let changed = self.expansion.select(id);
        self.expansion_changed(changed)
    }

    pub fn collapse(&mut self, id: &RowId) -> bool {
        let changed = self.expansion.deselect(id);
        self.expansion_changed(changed)
    }

    pub fn toggle_expansion(&mut self, id: &RowId) -> bool {
        let changed = self.expansion.toggle(id);
        self.expansion_changed(changed)
    }

    /// Expands every row on the current page.
    pub fn expand_all(&mut self) -> bool {
        let ids = self.view().ids(&self.config.id_field);
        let added = self.expansion.select_all(&ids);
        self.expansion_changed(!added.is_empty())
    }

    pub fn collapse_all(&mut self) -> bool {
        let removed = self.expansion.clear();
        self.expansion_changed(!removed.is_empty())
    }

    pub fn is_expanded(&self, id: &RowId) -> bool {
        self.expansion.contains(id) && self.is_live(id)
    }

    /// Expanded ids that still exist.
    pub fn expanded_ids(&self) -> BTreeSet<RowId> {
        self.expansion.live_ids(|id| self.is_live(id))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn dispatched(&self, dispatch: Dispatch) -> Dispatch {
        self.listener.on_view_change(self.controller.view());
        dispatch
    }

    fn check_column(&self, field: &str) -> Result<(), ColumnError> {
        if self.columns.contains(field) {
            Ok(())
        } else {
            Err(ColumnError::UnknownColumn(field.to_string()))
        }
    }

    /// Remote mode only holds one page, so ids from other pages count as live.
    fn is_live(&self, id: &RowId) -> bool {
        match self.controller.mode() {
            Mode::Local => self.local.contains(id),
            Mode::Remote => true,
        }
    }

    fn selection_changed(&self, changed: bool) -> bool {
        if changed {
            self.listener.on_selection_change(&self.selected_ids());
        }
        changed
    }

    fn expansion_changed(&self, changed: bool) -> bool {
        if changed {
            self.listener.on_expansion_change(&self.expanded_ids());
        }
        changed
    }
}

impl std::fmt::Debug for DataTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTable")
            .field("config", &self.config)
            .field("controller", &self.controller)
            .field("rows", &self.local.len())
            .field("editing", &self.edits.editing_row())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::ColumnType;
    use crate::selection::SelectionMode;

    #[derive(Default)]
    struct Recorder {
        views: Mutex<usize>,
        updated: Mutex<Vec<Row>>,
        selections: Mutex<Vec<BTreeSet<RowId>>>,
    }

    impl TableListener for Arc<Recorder> {
        fn on_view_change(&self, _view: &ViewResult) {
            *self.views.lock().unwrap() += 1;
        }

        fn on_row_updated(&self, row: &Row) {
            self.updated.lock().unwrap().push(row.clone());
        }

        fn on_selection_change(&self, selected: &BTreeSet<RowId>) {
            self.selections.lock().unwrap().push(selected.clone());
        }
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", ColumnType::Text),
            ColumnDefinition::new("name", ColumnType::Text).sortable().editable(),
            ColumnDefinition::new("price", ColumnType::Number).sortable().editable(),
            ColumnDefinition::new("stock", ColumnType::Number),
        ]
    }

    fn rows() -> Vec<Row> {
        (1..=25)
            .map(|i| {
                Row::new()
                    .set("id", format!("r{:02}", i))
                    .set("name", format!("Item {}", i))
                    .set("price", i as f64)
                    .set("stock", 100 - i as i64)
            })
            .collect()
    }

    fn table() -> (DataTable, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let mut table = DataTable::new(TableConfig::default(), columns(), rows())
            .unwrap()
            .with_listener(Arc::clone(&recorder));
        let _ = table.mount();
        (table, recorder)
    }

    #[test]
    fn test_mount_evaluates_first_page() {
        let (table, recorder) = table();
        assert_eq!(table.view().len(), 10);
        assert_eq!(table.view().total_matched(), 25);
        assert_eq!(table.page_count(), 3);
        assert_eq!(*recorder.views.lock().unwrap(), 1);
    }

    #[test]
    fn test_search_resets_page() {
        let (mut table, _) = table();
        let _ = table.set_page(3);
        assert_eq!(table.descriptor().page(), 3);

        let _ = table.set_search("item 2");
        assert_eq!(table.descriptor().page(), 1);
        // "Item 2" and "Item 20".."Item 25"
        assert_eq!(table.view().total_matched(), 7);
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let (mut table, _) = table();
        let _ = table.set_page(2);
        let _ = table.set_page_size(5);
        assert_eq!(table.descriptor().page(), 1);
        assert_eq!(table.view().len(), 5);
        assert_eq!(table.page_count(), 5);
    }

    #[test]
    fn test_filter_on_unknown_column_is_rejected() {
        let (mut table, _) = table();
        let err = table.add_filter(FilterRule::contains("color", "red")).unwrap_err();
        assert_eq!(err, TableError::Column(ColumnError::UnknownColumn("color".into())));
        assert!(table.descriptor().filters().is_empty());
    }

    #[test]
    fn test_toggle_sort_cycles() {
        let (mut table, _) = table();
        let _ = table.toggle_sort("price").unwrap();
        let _ = table.toggle_sort("price").unwrap();
        assert_eq!(table.view().ids("id")[0], RowId::from("r25"));
        let _ = table.toggle_sort("price").unwrap();
        assert!(!table.descriptor().sort().is_active());

        assert_eq!(
            table.toggle_sort("stock").unwrap_err(),
            TableError::Column(ColumnError::NotSortable("stock".into()))
        );
    }

    #[test]
    fn test_commit_fires_row_updated_once() {
        let (mut table, recorder) = table();
        let id = RowId::from("r03");
        table.start_edit(&id).unwrap();
        table.set_field("price", 99.0).unwrap();
        let merged = table.commit_edit().unwrap();

        assert_eq!(merged.get("price"), Some(&Value::from(99.0)));
        assert_eq!(merged.get("name"), Some(&Value::from("Item 3")));
        assert_eq!(*recorder.updated.lock().unwrap(), vec![merged.clone()]);
        assert_eq!(table.dataset().get(&id), Some(&merged));
        assert!(table.edit_session().is_none());
    }

    #[test]
    fn test_column_reset_cancels_edit() {
        let (mut table, _) = table();
        table.start_edit(&RowId::from("r01")).unwrap();
        let _ = table.set_columns(columns()).unwrap();
        assert!(table.edit_session().is_none());
    }

    #[test]
    fn test_selection_survives_paging_and_reads_live_ids() {
        let (mut table, recorder) = table();
        assert!(table.select(&RowId::from("r02")));
        let _ = table.set_page(2);
        assert!(table.select(&RowId::from("r12")));
        assert_eq!(table.selected_ids().len(), 2);

        // r02 leaves the dataset: still recorded, no longer reported
        let remaining: Vec<Row> = rows().into_iter().filter(|r| r.get_str("id").unwrap() != Some("r02")).collect();
        let _ = table.set_rows(remaining).unwrap();
        assert!(!table.is_selected(&RowId::from("r02")));
        assert_eq!(table.selected_ids().into_iter().collect::<Vec<_>>(), [RowId::from("r12")]);

        assert_eq!(recorder.selections.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_select_all_scopes() {
        let (mut table, _) = table();
        table.select_all(SelectAllScope::CurrentPage);
        assert_eq!(table.selected_ids().len(), 10);

        table.clear_selection();
        let _ = table.set_search("item 1");
        table.select_all(SelectAllScope::AllMatched);
        // "Item 1" and "Item 10".."Item 19"
        assert_eq!(table.selected_ids().len(), 11);
    }

    #[test]
    fn test_selection_mode_none_ignores_requests() {
        let config = TableConfig::default().with_selection_mode(SelectionMode::None);
        let mut table = DataTable::new(config, columns(), rows()).unwrap();
        let _ = table.mount();
        assert!(!table.select(&RowId::from("r01")));
        assert!(!table.select_all(SelectAllScope::CurrentPage));
        assert!(table.selected_ids().is_empty());
    }

    #[test]
    fn test_expansion_is_independent_of_selection() {
        let (mut table, _) = table();
        assert!(table.expand(&RowId::from("r01")));
        assert!(table.is_expanded(&RowId::from("r01")));
        assert!(!table.is_selected(&RowId::from("r01")));
        assert!(table.toggle_expansion(&RowId::from("r01")));
        assert!(table.expanded_ids().is_empty());
    }

    #[test]
    fn test_set_mode_remote_without_source() {
        let (mut table, _) = table();
        assert_eq!(table.set_mode(Mode::Remote).unwrap_err(), TableError::NoRemoteSource);
        assert_eq!(table.mode(), Mode::Local);
    }
}
