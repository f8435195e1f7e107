//! Column definitions and per-column text/sort-key resolution.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::Value;
use super::value::json_text;
use crate::error::FieldValidationError;

/// Extracts the canonical display text of a cell.
pub type TextExtractor = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Extracts the ordering key of a cell.
pub type SortKeyExtractor = Arc<dyn Fn(&Value) -> SortKey + Send + Sync>;

/// Validates a pending cell value. `Err` carries the user-facing message.
pub type CellValidator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// How a column is displayed, and therefore how its cells resolve to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Date,
    /// `{label, src}` payloads; text is the label.
    Avatar,
    /// `{status, color}` payloads; text is the status.
    Tag,
    Dropdown,
    Multiselect,
    Slider,
    /// Rendered by a caller-supplied renderer; supply a text extractor too.
    Custom,
}

impl ColumnType {
    /// Object keys probed for structured cells, in priority order.
    fn label_keys(self) -> &'static [&'static str] {
        match self {
            ColumnType::Avatar => &["label", "name", "alt"],
            ColumnType::Tag => &["status", "label", "text"],
            ColumnType::Dropdown | ColumnType::Multiselect => &["label", "value", "name"],
            _ => &["label", "name", "title", "status", "text", "value"],
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Number | ColumnType::Slider)
    }
}

/// Ordering key of one cell.
///
/// Keys of different kinds order as `Null < Bool < Number < Date < Text`;
/// text compares case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Null,
    Bool(bool),
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Bool(_) => 1,
            SortKey::Number(_) => 2,
            SortKey::Date(_) => 3,
            SortKey::Text(_) => 4,
        }
    }

    /// Total order over keys.
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Builds a text key; text keys are stored lowercased.
    pub fn text(s: &str) -> Self {
        SortKey::Text(s.to_lowercase())
    }
}

/// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
pub(crate) fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Definition of a single grid column.
///
/// Definitions are immutable once registered. Each definition supplies the
/// canonical text and ordering key of its cells, so search, filtering and
/// sorting treat structured values (avatars, tags) consistently.
///
/// # Example
///
/// ```
/// use tablegrid_lib::model::{ColumnDefinition, ColumnType};
///
/// let price = ColumnDefinition::new("price", ColumnType::Number)
///     .header("Price")
///     .sortable()
///     .editable()
///     .width(80, 160)
///     .validate_with(|v| match v.as_f64() {
///         Some(p) if p < 0.0 => Err("Price cannot be negative".into()),
///         _ => Ok(()),
///     });
/// ```
#[derive(Clone)]
pub struct ColumnDefinition {
    field: String,
    header: String,
    column_type: ColumnType,
    sortable: bool,
    editable: bool,
    min_width: Option<u16>,
    max_width: Option<u16>,
    renderer: Option<String>,
    text: Option<TextExtractor>,
    sort_key: Option<SortKeyExtractor>,
    validator: Option<CellValidator>,
}

impl ColumnDefinition {
    /// Creates a column for `field`. The header defaults to the field name.
    pub fn new(field: impl Into<String>, column_type: ColumnType) -> Self {
        let field = field.into();
        Self {
            header: field.clone(),
            field,
            column_type,
            sortable: false,
            editable: false,
            min_width: None,
            max_width: None,
            renderer: None,
            text: None,
            sort_key: None,
            validator: None,
        }
    }

    /// Set the header label.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Make the column's cells editable.
    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Set the width bounds.
    pub fn width(mut self, min: u16, max: u16) -> Self {
        self.min_width = Some(min);
        self.max_width = Some(max.max(min));
        self
    }

    /// Name the custom renderer the view layer should use.
    pub fn renderer(mut self, key: impl Into<String>) -> Self {
        self.renderer = Some(key.into());
        self
    }

    /// Override the canonical text of this column's cells.
    pub fn text_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.text = Some(Arc::new(f));
        self
    }

    /// Override the ordering key of this column's cells.
    pub fn sort_key_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> SortKey + Send + Sync + 'static,
    {
        self.sort_key = Some(Arc::new(f));
        self
    }

    /// Add a validator run on commit, after the type check.
    pub fn validate_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(f));
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn header_label(&self) -> &str {
        &self.header
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn min_width(&self) -> Option<u16> {
        self.min_width
    }

    pub fn max_width(&self) -> Option<u16> {
        self.max_width
    }

    pub fn renderer_key(&self) -> Option<&str> {
        self.renderer.as_deref()
    }

    /// Clamps a requested width into this column's bounds.
    pub fn clamp_width(&self, width: u16) -> u16 {
        let width = self.min_width.map_or(width, |min| width.max(min));
        self.max_width.map_or(width, |max| width.min(max))
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Canonical display text of a cell in this column.
    pub fn display_text(&self, value: &Value) -> String {
        if let Some(text) = &self.text {
            return text(value);
        }
        match (self.column_type, value) {
            (ColumnType::Date, Value::DateTime(dt)) => dt.format("%Y-%m-%d").to_string(),
            (column_type, Value::Json(json)) => json_text(json, column_type.label_keys()),
            (column_type, Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Json(json) => json_text(json, column_type.label_keys()),
                    other => other.display_text(),
                })
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            (_, other) => other.display_text(),
        }
    }

    /// Ordering key of a cell in this column.
    pub fn sort_key(&self, value: &Value) -> SortKey {
        if let Some(sort_key) = &self.sort_key {
            return sort_key(value);
        }
        match value {
            Value::Null => SortKey::Null,
            Value::Bool(b) => SortKey::Bool(*b),
            Value::DateTime(dt) => SortKey::Date(*dt),
            Value::String(s) if self.column_type.is_numeric() => s
                .trim()
                .parse::<f64>()
                .map(SortKey::Number)
                .unwrap_or_else(|_| SortKey::text(s)),
            Value::String(s) if self.column_type == ColumnType::Date => {
                parse_date(s).map(SortKey::Date).unwrap_or_else(|| SortKey::text(s))
            }
            other => match other.as_f64() {
                Some(n) => SortKey::Number(n),
                None => SortKey::text(&self.display_text(other)),
            },
        }
    }

    /// Checks a pending value against the declared type, then the validator.
    pub fn validate(&self, value: &Value) -> Result<(), FieldValidationError> {
        self.check_type(value)
            .map_err(|message| FieldValidationError::with_code(&self.field, message, "type"))?;
        if let Some(validator) = &self.validator {
            validator(value).map_err(|message| FieldValidationError::new(&self.field, message))?;
        }
        Ok(())
    }

    fn check_type(&self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            return Ok(());
        }
        let ok = match self.column_type {
            ColumnType::Number | ColumnType::Slider => value.is_numeric(),
            ColumnType::Date => match value {
                Value::DateTime(_) => true,
                Value::String(s) => parse_date(s).is_some(),
                _ => false,
            },
            ColumnType::Text => matches!(value, Value::String(_)),
            ColumnType::Multiselect => matches!(value, Value::List(_)),
            ColumnType::Avatar | ColumnType::Tag | ColumnType::Dropdown | ColumnType::Custom => true,
        };
        if ok {
            Ok(())
        } else {
            Err(format!(
                "{} is not a valid {:?} value",
                value.type_name(),
                self.column_type
            ))
        }
    }
}

impl fmt::Debug for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("field", &self.field)
            .field("header", &self.header)
            .field("column_type", &self.column_type)
            .field("sortable", &self.sortable)
            .field("editable", &self.editable)
            .field("min_width", &self.min_width)
            .field("max_width", &self.max_width)
            .field("renderer", &self.renderer)
            .field("custom_text", &self.text.is_some())
            .field("custom_sort_key", &self.sort_key.is_some())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_avatar_text_is_label() {
        let column = ColumnDefinition::new("owner", ColumnType::Avatar);
        let cell = Value::from(json!({ "src": "/a.png", "label": "Grace Hopper" }));
        assert_eq!(column.display_text(&cell), "Grace Hopper");
    }

    #[test]
    fn test_tag_text_is_status() {
        let column = ColumnDefinition::new("state", ColumnType::Tag);
        let cell = Value::from(json!({ "label": "ignored", "status": "In Stock" }));
        assert_eq!(column.display_text(&cell), "In Stock");
    }

    #[test]
    fn test_date_text_and_key() {
        let column = ColumnDefinition::new("released", ColumnType::Date);
        let dt = parse_date("2024-03-05").unwrap();
        assert_eq!(column.display_text(&Value::from(dt)), "2024-03-05");
        assert_eq!(column.sort_key(&Value::from("2024-03-05")), SortKey::Date(dt));
    }

    #[test]
    fn test_numeric_string_sorts_numerically() {
        let column = ColumnDefinition::new("qty", ColumnType::Number);
        let a = column.sort_key(&Value::from("9"));
        let b = column.sort_key(&Value::from("10"));
        assert_eq!(a.compare(&b), Ordering::Less);
    }

    #[test]
    fn test_mixed_kinds_order() {
        assert_eq!(SortKey::Null.compare(&SortKey::Number(-1.0)), Ordering::Less);
        assert_eq!(SortKey::Number(1e9).compare(&SortKey::text("a")), Ordering::Less);
        assert_eq!(SortKey::text("B").compare(&SortKey::text("a")), Ordering::Greater);
    }

    #[test]
    fn test_type_check() {
        let column = ColumnDefinition::new("price", ColumnType::Number);
        assert!(column.validate(&Value::from(3.5)).is_ok());
        assert!(column.validate(&Value::Null).is_ok());
        let err = column.validate(&Value::from("cheap")).unwrap_err();
        assert_eq!(err.field, "price");
        assert_eq!(err.code.as_deref(), Some("type"));
    }

    #[test]
    fn test_custom_validator_runs_after_type_check() {
        let column = ColumnDefinition::new("price", ColumnType::Number)
            .validate_with(|v| if v.as_f64() < Some(0.0) { Err("negative".into()) } else { Ok(()) });
        assert_eq!(column.validate(&Value::from(-1.0)).unwrap_err().message, "negative");
        assert!(column.validate(&Value::from(1.0)).is_ok());
    }

    #[test]
    fn test_custom_text_extractor() {
        let column = ColumnDefinition::new("sku", ColumnType::Custom)
            .text_with(|v| format!("SKU-{}", v.display_text()));
        assert_eq!(column.display_text(&Value::from(7i64)), "SKU-7");
    }

    #[test]
    fn test_clamp_width() {
        let column = ColumnDefinition::new("name", ColumnType::Text).width(40, 120);
        assert_eq!(column.clamp_width(10), 40);
        assert_eq!(column.clamp_width(80), 80);
        assert_eq!(column.clamp_width(500), 120);
    }
}
