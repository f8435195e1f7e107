//! Edit session error types

use super::FieldErrors;
use crate::model::RowId;

/// Errors returned by edit session transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The row is not present in the canonical dataset.
    #[error("Row '{0}' not found")]
    RowNotFound(RowId),

    /// The field is unknown, not editable, or the identity field.
    #[error("Field '{0}' is not editable")]
    InvalidField(String),

    /// One or more pending values failed validation; the session stays open.
    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    /// Another row is already being edited.
    #[error("Row '{0}' is already being edited")]
    AlreadyEditing(RowId),

    /// No edit session is active.
    #[error("No active edit session")]
    NoActiveEdit,
}
