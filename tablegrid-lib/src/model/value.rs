//! Value enum for dynamic cell values

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

use super::RowId;

/// Keys probed, in order, when a structured cell has no column-specific
/// text extractor.
const LABEL_KEYS: [&str; 6] = ["label", "name", "title", "status", "text", "value"];

/// A dynamic value that can hold any grid cell.
///
/// # Type Mapping
///
/// | JSON | Rust Variant |
/// |------|--------------|
/// | null | `Null` |
/// | boolean | `Bool` |
/// | integer | `Int` |
/// | other number | `Float` |
/// | string | `String` |
/// | array | `List` |
/// | object | `Json` |
///
/// `DateTime` and `Decimal` are never produced by deserialization. Strings stay
/// strings even when they look like timestamps; date columns parse them on
/// demand. Build `Decimal` explicitly when exact arithmetic matters.
///
/// # Example
///
/// ```
/// use tablegrid_lib::model::Value;
///
/// let name = Value::from("Laptop");
/// let price = Value::from(2499.99);
/// let stock = Value::from(12i64);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(String),
    /// Date and time in UTC.
    DateTime(DateTime<Utc>),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// Ordered list of values (multiselect cells).
    List(Vec<Value>),
    /// Structured payload such as an avatar `{label, src}` or a tag `{status, color}`.
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for integer, float and decimal values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Decimal(_))
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::DateTime(_) => "datetime",
            Value::String(_) => "string",
            Value::Decimal(_) => "decimal",
            Value::List(_) => "list",
            Value::Json(_) => "json",
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        use rust_decimal::prelude::ToPrimitive;

        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Generic display text used when a column supplies no extractor.
    ///
    /// Structured objects resolve to their first label-like key, never to a
    /// serialization of the whole object.
    pub fn display_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::DateTime(dt) => dt.to_rfc3339(),
            Value::String(s) => s.clone(),
            Value::Decimal(d) => d.to_string(),
            Value::List(items) => items
                .iter()
                .map(Value::display_text)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            Value::Json(json) => json_text(json, &LABEL_KEYS),
        }
    }

    /// Converts an identifier cell into a [`RowId`].
    ///
    /// Only strings and integers identify rows.
    pub fn to_row_id(&self) -> Option<RowId> {
        match self {
            Value::String(s) => Some(RowId::new(s.clone())),
            Value::Int(n) => Some(RowId::new(n.to_string())),
            _ => None,
        }
    }
}

/// Resolves a JSON payload to text by probing `keys` on objects.
pub(crate) fn json_text(json: &serde_json::Value, keys: &[&str]) -> String {
    match json {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| json_text(item, keys))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Object(map) => keys
            .iter()
            .find_map(|key| match map.get(*key) {
                Some(serde_json::Value::Object(_)) | None => None,
                Some(inner) => Some(json_text(inner, keys)),
            })
            .unwrap_or_default(),
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}
