//! Canonical row collection with a unique identity field.

use std::collections::HashMap;

use super::Row;
use super::RowId;
use crate::error::DatasetError;

/// The authoritative in-memory rows a table reads and writes against.
///
/// Construction enforces that every row carries a unique identifier in
/// `id_field`. The engine never changes identifiers afterwards.
///
/// # Example
///
/// ```
/// use tablegrid_lib::model::{Dataset, Row, RowId};
///
/// let dataset = Dataset::new("id", vec![
///     Row::new().set("id", "a").set("name", "Laptop"),
///     Row::new().set("id", "b").set("name", "Phone"),
/// ])?;
///
/// assert!(dataset.contains(&RowId::from("b")));
/// # Ok::<(), tablegrid_lib::error::DatasetError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    id_field: String,
    rows: Vec<Row>,
    index: HashMap<RowId, usize>,
}

impl Dataset {
    /// Creates a dataset, validating the identity invariant.
    pub fn new(id_field: impl Into<String>, rows: Vec<Row>) -> Result<Self, DatasetError> {
        let id_field = id_field.into();
        let index = build_index(&id_field, &rows)?;
        Ok(Self {
            id_field,
            rows,
            index,
        })
    }

    /// Creates an empty dataset.
    pub fn empty(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the identity field name.
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Returns the rows in dataset order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `true` if a row with `id` exists.
    pub fn contains(&self, id: &RowId) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the row with `id`.
    pub fn get(&self, id: &RowId) -> Option<&Row> {
        self.index.get(id).map(|&i| &self.rows[i])
    }

    /// Returns the identifier of `row` under this dataset's identity field.
    pub fn id_of(&self, row: &Row) -> Option<RowId> {
        row.id(&self.id_field)
    }

    /// Iterates over row ids in dataset order.
    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().filter_map(|row| row.id(&self.id_field))
    }

    /// Replaces all rows, validating the identity invariant.
    ///
    /// On error the dataset is left unchanged.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Result<(), DatasetError> {
        self.index = build_index(&self.id_field, &rows)?;
        self.rows = rows;
        Ok(())
    }

    /// Applies `f` to the row with `id` and returns the updated row.
    ///
    /// The identity field is restored after `f` runs, so a row can never
    /// change its identifier through this path.
    pub(crate) fn update<F>(&mut self, id: &RowId, f: F) -> Option<&Row>
    where
        F: FnOnce(&mut Row),
    {
        let &i = self.index.get(id)?;
        let row = &mut self.rows[i];
        let original_id = row.get(&self.id_field).cloned();
        f(row);
        if let Some(original_id) = original_id {
            row.insert(self.id_field.clone(), original_id);
        }
        Some(&self.rows[i])
    }
}

fn build_index(id_field: &str, rows: &[Row]) -> Result<HashMap<RowId, usize>, DatasetError> {
    let mut index = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let value = row.get(id_field).ok_or_else(|| DatasetError::MissingId {
            index: i,
            id_field: id_field.to_string(),
        })?;
        let id = value.to_row_id().ok_or_else(|| DatasetError::InvalidId {
            index: i,
            id_field: id_field.to_string(),
            actual: value.type_name(),
        })?;
        if index.insert(id.clone(), i).is_some() {
            return Err(DatasetError::DuplicateId(id));
        }
    }
    Ok(index)
}
