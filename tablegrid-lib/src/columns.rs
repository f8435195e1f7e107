//! Column registry: ordered definitions plus visibility and freeze state.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ColumnError;
use crate::model::ColumnDefinition;
use crate::model::Row;
use crate::model::SortKey;

/// Control columns the view layer pins ahead of the data columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlColumns {
    /// Row selection checkbox column.
    pub selection: bool,
    /// Row expansion toggle column.
    pub expansion: bool,
}

impl ControlColumns {
    /// Number of control columns present.
    pub fn count(&self) -> usize {
        usize::from(self.selection) + usize::from(self.expansion)
    }
}

/// Ordered column definitions with visibility and freeze-count state.
///
/// A registry is a value. Changing visibility or the freeze count yields a
/// new registry; the definitions themselves are shared and never mutated.
///
/// # Example
///
/// ```
/// use tablegrid_lib::columns::ColumnRegistry;
/// use tablegrid_lib::model::{ColumnDefinition, ColumnType};
///
/// let registry = ColumnRegistry::new(vec![
///     ColumnDefinition::new("name", ColumnType::Text),
///     ColumnDefinition::new("price", ColumnType::Number),
///     ColumnDefinition::new("stock", ColumnType::Number),
/// ])?
/// .with_freeze_count(2);
///
/// // Hiding a frozen column re-clamps the freeze count to the visible columns
/// let registry = registry.with_visibility("price", false)?.with_freeze_count(5);
/// assert_eq!(registry.freeze_count(), 2);
/// # Ok::<(), tablegrid_lib::error::ColumnError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: Arc<[ColumnDefinition]>,
    hidden: HashSet<String>,
    freeze_count: usize,
    controls: ControlColumns,
}

impl ColumnRegistry {
    /// Creates a registry with every column visible and nothing frozen.
    pub fn new(columns: Vec<ColumnDefinition>) -> Result<Self, ColumnError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.field()) {
                return Err(ColumnError::DuplicateColumn(column.field().to_string()));
            }
        }
        Ok(Self {
            columns: columns.into(),
            hidden: HashSet::new(),
            freeze_count: 0,
            controls: ControlColumns::default(),
        })
    }

    /// Returns a registry with the given control columns.
    pub fn with_controls(&self, controls: ControlColumns) -> Self {
        Self {
            controls,
            ..self.clone()
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// All definitions in registration order, hidden ones included.
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Returns the definition for `field`.
    pub fn get(&self, field: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.field() == field)
    }

    /// Returns `true` if a column is registered for `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn controls(&self) -> ControlColumns {
        self.controls
    }

    /// Returns `true` if `field` is registered as editable.
    pub fn is_editable(&self, field: &str) -> bool {
        self.get(field).is_some_and(ColumnDefinition::is_editable)
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    /// Returns `true` if `field` is registered and not hidden.
    pub fn is_visible(&self, field: &str) -> bool {
        self.contains(field) && !self.hidden.contains(field)
    }

    /// Visible columns in registration order.
    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns
            .iter()
            .filter(|c| !self.hidden.contains(c.field()))
    }

    pub fn visible_count(&self) -> usize {
        self.visible_columns().count()
    }

    /// Returns a registry with `field` shown or hidden.
    pub fn with_visibility(&self, field: &str, visible: bool) -> Result<Self, ColumnError> {
        if !self.contains(field) {
            return Err(ColumnError::UnknownColumn(field.to_string()));
        }
        let mut next = self.clone();
        if visible {
            next.hidden.remove(field);
        } else {
            next.hidden.insert(field.to_string());
        }
        next.freeze_count = next.freeze_count.min(next.visible_count());
        Ok(next)
    }

    /// Returns a registry with `field`'s visibility flipped.
    pub fn with_toggled(&self, field: &str) -> Result<Self, ColumnError> {
        self.with_visibility(field, !self.is_visible(field))
    }

    // =========================================================================
    // Freezing
    // =========================================================================

    /// Returns a registry that pins the first `n` visible columns, with `n`
    /// clamped to the number of visible columns.
    pub fn with_freeze_count(&self, n: usize) -> Self {
        Self {
            freeze_count: n.min(self.visible_count()),
            ..self.clone()
        }
    }

    /// Number of visible data columns pinned from horizontal scroll.
    pub fn freeze_count(&self) -> usize {
        self.freeze_count
    }

    /// Pinned visible data columns.
    pub fn frozen_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.visible_columns().take(self.freeze_count)
    }

    /// Visible data columns that scroll horizontally.
    pub fn scrollable_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.visible_columns().skip(self.freeze_count)
    }

    /// Leading columns pinned from horizontal scroll, control columns included.
    pub fn pinned_leading_count(&self) -> usize {
        self.controls.count() + self.freeze_count
    }

    // =========================================================================
    // Cell resolution
    // =========================================================================

    /// Canonical text of `row[field]`; empty when the field is absent.
    ///
    /// Unregistered fields fall back to the value's generic text.
    pub fn cell_text(&self, row: &Row, field: &str) -> String {
        match (row.get(field), self.get(field)) {
            (None, _) => String::new(),
            (Some(value), Some(column)) => column.display_text(value),
            (Some(value), None) => value.display_text(),
        }
    }

    /// Ordering key of `row[field]`; absent fields order as null.
    pub fn cell_sort_key(&self, row: &Row, field: &str) -> SortKey {
        match (row.get(field), self.get(field)) {
            (None, _) => SortKey::Null,
            (Some(value), Some(column)) => column.sort_key(value),
            (Some(value), None) => ColumnDefinition::new(field, Default::default()).sort_key(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnType;

    fn registry() -> ColumnRegistry {
        ColumnRegistry::new(vec![
            ColumnDefinition::new("name", ColumnType::Text),
            ColumnDefinition::new("price", ColumnType::Number),
            ColumnDefinition::new("stock", ColumnType::Number),
            ColumnDefinition::new("owner", ColumnType::Avatar),
        ])
        .unwrap()
    }

    fn fields<'a>(columns: impl Iterator<Item = &'a ColumnDefinition>) -> Vec<&'a str> {
        columns.map(ColumnDefinition::field).collect()
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = ColumnRegistry::new(vec![
            ColumnDefinition::new("name", ColumnType::Text),
            ColumnDefinition::new("name", ColumnType::Number),
        ])
        .unwrap_err();
        assert_eq!(err, ColumnError::DuplicateColumn("name".into()));
    }

    #[test]
    fn test_freeze_count_clamped_to_visible() {
        let r = registry().with_freeze_count(10);
        assert_eq!(r.freeze_count(), 4);

        let r = registry()
            .with_visibility("price", false)
            .unwrap()
            .with_freeze_count(10);
        assert_eq!(r.freeze_count(), 3);
    }

    #[test]
    fn test_hidden_columns_do_not_count_toward_freeze() {
        let r = registry()
            .with_visibility("name", false)
            .unwrap()
            .with_freeze_count(2);
        assert_eq!(fields(r.frozen_columns()), ["price", "stock"]);
        assert_eq!(fields(r.scrollable_columns()), ["owner"]);
    }

    #[test]
    fn test_hiding_reclamps_freeze_count() {
        let r = registry().with_freeze_count(4);
        let r = r.with_visibility("owner", false).unwrap();
        assert_eq!(r.freeze_count(), 3);
    }

    #[test]
    fn test_toggle_returns_new_registry() {
        let original = registry();
        let toggled = original.with_toggled("stock").unwrap();
        assert!(original.is_visible("stock"));
        assert!(!toggled.is_visible("stock"));
        assert!(toggled.with_toggled("stock").unwrap().is_visible("stock"));
        assert_eq!(
            original.with_toggled("nope").unwrap_err(),
            ColumnError::UnknownColumn("nope".into())
        );
    }

    #[test]
    fn test_pinned_leading_count_includes_controls() {
        let r = registry()
            .with_controls(ControlColumns {
                selection: true,
                expansion: true,
            })
            .with_freeze_count(1);
        assert_eq!(r.pinned_leading_count(), 3);
    }
}
