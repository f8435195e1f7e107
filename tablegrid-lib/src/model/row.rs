//! Dynamic grid row

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use super::Value;
use crate::error::FieldError;

/// Identifier of a row, derived from the row's identity field.
///
/// Selection, expansion and edit state are keyed by `RowId` so they stay
/// stable across pagination, filtering and remote refreshes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Creates a row id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// An ordered mapping from field name to cell value.
///
/// Field order is insertion order and survives serialization, so a row
/// round-trips through the remote wire format unchanged.
///
/// # Example
///
/// ```
/// use tablegrid_lib::model::Row;
///
/// let row = Row::new()
///     .set("id", "p-1")
///     .set("name", "Laptop")
///     .set("price", 2499.99);
///
/// assert_eq!(row.get_str("name").unwrap(), Some("Laptop"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the row contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates over `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reads the identifier of this row from `id_field`.
    pub fn id(&self, id_field: &str) -> Option<RowId> {
        self.fields.get(id_field).and_then(Value::to_row_id)
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value, keeping the field's position if it already exists.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if field is missing or wrong type.
    // Return Ok(None) only if the field exists and is Value::Null.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_str(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(FieldError::type_mismatch(field, "string", other.type_name())),
        }
    }

    /// Gets a numeric field value as `f64` (int, float and decimal all widen).
    pub fn get_f64(&self, field: &str) -> Result<Option<f64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| FieldError::type_mismatch(field, "number", value.type_name())),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CellProblem;

    #[test]
    fn test_field_order_is_insertion_order() {
        let row = Row::new().set("b", 1i64).set("a", 2i64).set("c", 3i64);
        let names: Vec<_> = row.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn test_typed_getters() {
        let row = Row::new().set("price", 10i64).set("name", "x").set("gone", Value::Null);
        assert_eq!(row.get_f64("price").unwrap(), Some(10.0));
        assert_eq!(row.get_str("gone").unwrap(), None);
        assert!(row.get_str("missing").unwrap_err().is_missing());

        let err = row.get_str("price").unwrap_err();
        assert_eq!(
            err.problem,
            CellProblem::TypeMismatch {
                expected: "string",
                actual: "int"
            }
        );
        assert_eq!(err.row, None);
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let row = Row::new().set("id", 7i64).set("name", "Desk");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":7,"name":"Desk"}"#);
        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
        assert_eq!(back.id("id"), Some(RowId::from("7")));
    }
}
