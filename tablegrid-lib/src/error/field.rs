//! Typed cell access errors

use std::fmt;

use crate::model::RowId;

/// What went wrong reading a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellProblem {
    /// The row has no such field.
    Missing,
    /// The cell holds a different kind of value.
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl fmt::Display for CellProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellProblem::Missing => f.write_str("missing"),
            CellProblem::TypeMismatch { expected, actual } => {
                write!(f, "expected {}, got {}", expected, actual)
            }
        }
    }
}

/// A typed getter on [`Row`](crate::model::Row) failed.
///
/// Rows do not know which field identifies them, so the row id is attached
/// afterwards by whoever does, via [`FieldError::in_row`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cell '{field}'{} {problem}", row_suffix(.row.as_ref()))]
pub struct FieldError {
    pub field: String,
    pub row: Option<RowId>,
    pub problem: CellProblem,
}

fn row_suffix(row: Option<&RowId>) -> String {
    row.map(|id| format!(" of row '{}'", id)).unwrap_or_default()
}

impl FieldError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            row: None,
            problem: CellProblem::Missing,
        }
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self {
            field: field.into(),
            row: None,
            problem: CellProblem::TypeMismatch { expected, actual },
        }
    }

    /// Attaches the id of the row the cell was read from.
    pub fn in_row(self, id: RowId) -> Self {
        Self {
            row: Some(id),
            ..self
        }
    }

    pub fn is_missing(&self) -> bool {
        self.problem == CellProblem::Missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_includes_row_once_known() {
        let err = FieldError::type_mismatch("price", "number", "string");
        assert_eq!(err.to_string(), "Cell 'price' expected number, got string");

        let err = err.in_row(RowId::from("SKU-002"));
        assert_eq!(
            err.to_string(),
            "Cell 'price' of row 'SKU-002' expected number, got string"
        );
        assert!(!err.is_missing());
        assert!(FieldError::missing("owner").is_missing());
    }
}
