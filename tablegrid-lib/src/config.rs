//! Table configuration

use crate::columns::ControlColumns;
use crate::controller::EscalationPolicy;
use crate::controller::Mode;
use crate::query::DEFAULT_PAGE_SIZE;
use crate::selection::SelectionMode;

/// Construction-time settings for a [`DataTable`](crate::table::DataTable).
///
/// # Example
///
/// ```
/// use tablegrid_lib::config::TableConfig;
/// use tablegrid_lib::controller::{EscalationPolicy, Mode};
///
/// let config = TableConfig::new("sku")
///     .with_page_size(25)
///     .with_escalation(EscalationPolicy::Automatic);
///
/// assert_eq!(config.mode, Mode::Local);
/// assert_eq!(config.page_size, 25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Field holding each row's unique identifier.
    ///
    /// Default: `"id"`
    pub id_field: String,

    /// Evaluation mode at mount.
    ///
    /// Default: [`Mode::Local`]
    pub mode: Mode,

    /// Rows per page at mount.
    ///
    /// Default: 10
    pub page_size: usize,

    /// Whether server-only operations may switch a local table to remote.
    ///
    /// Default: [`EscalationPolicy::Disabled`]
    pub escalation: EscalationPolicy,

    /// Default: [`SelectionMode::Multiple`]
    pub selection_mode: SelectionMode,

    /// Control columns pinned ahead of the data columns.
    ///
    /// Default: none
    pub controls: ControlColumns,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            mode: Mode::Local,
            page_size: DEFAULT_PAGE_SIZE,
            escalation: EscalationPolicy::Disabled,
            selection_mode: SelectionMode::Multiple,
            controls: ControlColumns::default(),
        }
    }
}

impl TableConfig {
    /// Creates a config keyed on `id_field`, other settings default.
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the initial page size.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is 0.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        assert!(page_size >= 1, "page size must be at least 1");
        self.page_size = page_size;
        self
    }

    pub fn with_escalation(mut self, policy: EscalationPolicy) -> Self {
        self.escalation = policy;
        self
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Pins the selection checkbox and/or expansion toggle columns.
    pub fn with_controls(mut self, selection: bool, expansion: bool) -> Self {
        self.controls = ControlColumns { selection, expansion };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();
        assert_eq!(config.id_field, "id");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.escalation, EscalationPolicy::Disabled);
        assert_eq!(config.controls.count(), 0);
    }

    #[test]
    fn test_builder_chain() {
        let config = TableConfig::new("sku")
            .with_mode(Mode::Remote)
            .with_selection_mode(SelectionMode::Single)
            .with_controls(true, false);
        assert_eq!(config.id_field, "sku");
        assert_eq!(config.mode, Mode::Remote);
        assert_eq!(config.selection_mode, SelectionMode::Single);
        assert_eq!(config.controls.count(), 1);
    }

    #[test]
    #[should_panic(expected = "page size must be at least 1")]
    fn test_zero_page_size_panics() {
        let _ = TableConfig::default().with_page_size(0);
    }
}
