//! Dataset and column registry error types

use crate::model::RowId;

/// Violations of the row identity invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    /// A row lacks the identity field.
    #[error("Row at index {index} has no '{id_field}' field")]
    MissingId { index: usize, id_field: String },

    /// The identity field holds a value that cannot identify a row.
    #[error("Row at index {index} has a non-identifier '{id_field}' ({actual})")]
    InvalidId {
        index: usize,
        id_field: String,
        actual: &'static str,
    },

    /// Two rows share the same identifier.
    #[error("Duplicate row id '{0}'")]
    DuplicateId(RowId),
}

/// Violations of the column registry invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    /// Two column definitions share a field name.
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    /// No column is registered for the field.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// The column does not allow sorting.
    #[error("Column '{0}' is not sortable")]
    NotSortable(String),
}
