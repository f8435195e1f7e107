//! Filter rules for narrowing the visible rows.

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::columns::ColumnRegistry;
use crate::model::Row;

/// Comparison applied by a [`FilterRule`]. All comparisons are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Whole resolved text equals the value.
    Equals,
    /// Resolved text contains the value.
    Contains,
    /// Resolved text starts with the value.
    StartsWith,
    /// Resolved text ends with the value.
    EndsWith,
}

/// One user-defined filter condition.
///
/// Serializes to the wire shape a remote source receives:
/// `{"id", "field", "operator": "equals"|"contains"|"startsWith"|"endsWith", "value"}`.
///
/// A rule whose value is empty or whitespace-only is inert: it matches every
/// row, whatever the operator.
///
/// # Example
///
/// ```
/// use tablegrid_lib::query::{FilterOperator, FilterRule};
///
/// let rule = FilterRule::contains("name", "lap");
/// assert_eq!(rule.operator, FilterOperator::Contains);
///
/// // Inert rules never narrow the result
/// assert!(FilterRule::equals("name", "  ").is_inert());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    /// Unique per rule instance.
    pub id: String,
    /// Field the rule applies to; should name a registered column.
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterRule {
    /// Creates a rule with a generated id.
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), field, operator, value)
    }

    /// Creates a rule with a caller-supplied id.
    pub fn with_id(
        id: impl Into<String>,
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Creates an equality rule.
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    /// Creates a contains rule.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }

    /// Creates a starts-with rule.
    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::StartsWith, value)
    }

    /// Creates an ends-with rule.
    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::EndsWith, value)
    }

    /// Returns `true` if this rule matches everything.
    pub fn is_inert(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Tests `row` against this rule, resolving the cell through its column.
    pub fn matches(&self, row: &Row, columns: &ColumnRegistry) -> bool {
        if self.is_inert() {
            return true;
        }
        let text = columns.cell_text(row, &self.field).to_lowercase();
        let needle = self.value.to_lowercase();
        match self.operator {
            FilterOperator::Equals => text == needle,
            FilterOperator::Contains => text.contains(&needle),
            FilterOperator::StartsWith => text.starts_with(&needle),
            FilterOperator::EndsWith => text.ends_with(&needle),
        }
    }
}

/// Tests `row` against every rule (logical AND).
///
/// Evaluates all rules without short-circuiting; the result does not depend
/// on rule order.
pub fn matches_all(rules: &[FilterRule], row: &Row, columns: &ColumnRegistry) -> bool {
    rules
        .iter()
        .fold(true, |acc, rule| rule.matches(row, columns) & acc)
}
