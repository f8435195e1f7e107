//! Inline row editing.
//!
//! A table edits at most one row at a time: `Idle -> Editing(row) -> Idle`.
//! Pending values are buffered in the session and only reach the canonical
//! row on a successful commit.
//!
//! Starting a second edit while one is active is rejected with
//! [`EditError::AlreadyEditing`]; the caller decides whether to commit or
//! cancel the open session first.

use indexmap::IndexSet;

use crate::columns::ColumnRegistry;
use crate::error::EditError;
use crate::error::FieldErrors;
use crate::model::Dataset;
use crate::model::Row;
use crate::model::RowId;
use crate::model::Value;

/// Buffered edits for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    row_id: RowId,
    /// Seeded with the row's values when editing starts.
    pending: Row,
    /// Fields changed through `set_field`, in edit order.
    dirty: IndexSet<String>,
}

impl EditSession {
    /// The row being edited.
    pub fn row_id(&self) -> &RowId {
        &self.row_id
    }

    /// The row as it would look after commit.
    pub fn pending(&self) -> &Row {
        &self.pending
    }

    /// Pending value of `field`.
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.pending.get(field)
    }

    /// Fields changed since editing started.
    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}

/// Owns the single edit session of a table.
#[derive(Debug, Clone, Default)]
pub struct EditSessionManager {
    session: Option<EditSession>,
}

impl EditSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// Id of the row being edited.
    pub fn editing_row(&self) -> Option<&RowId> {
        self.session.as_ref().map(EditSession::row_id)
    }

    /// Opens a session for `id`, seeded with the row's current values.
    pub fn start(&mut self, id: &RowId, dataset: &Dataset) -> Result<&EditSession, EditError> {
        if let Some(active) = &self.session {
            return Err(EditError::AlreadyEditing(active.row_id.clone()));
        }
        let row = dataset
            .get(id)
            .ok_or_else(|| EditError::RowNotFound(id.clone()))?;

        log::debug!("[edit] start row {}", id);
        Ok(self.session.insert(EditSession {
            row_id: id.clone(),
            pending: row.clone(),
            dirty: IndexSet::new(),
        }))
    }

    /// Buffers a new value for an editable field.
    ///
    /// The identity field is never editable.
    pub fn set_field(
        &mut self,
        field: &str,
        value: impl Into<Value>,
        columns: &ColumnRegistry,
        id_field: &str,
    ) -> Result<(), EditError> {
        let session = self.session.as_mut().ok_or(EditError::NoActiveEdit)?;
        if field == id_field || !columns.is_editable(field) {
            return Err(EditError::InvalidField(field.to_string()));
        }
        session.pending.insert(field, value);
        session.dirty.insert(field.to_string());
        Ok(())
    }

    /// Validates and merges the changed fields into the canonical row.
    ///
    /// On success the session closes and the full merged row is returned.
    /// On validation failure the session stays open. If the row has left the
    /// dataset the session is dropped, since it can never commit.
    pub fn commit(&mut self, dataset: &mut Dataset, columns: &ColumnRegistry) -> Result<Row, EditError> {
        let session = self.session.as_ref().ok_or(EditError::NoActiveEdit)?;

        if !dataset.contains(&session.row_id) {
            let id = session.row_id.clone();
            log::debug!("[edit] row {} vanished, dropping session", id);
            self.session = None;
            return Err(EditError::RowNotFound(id));
        }

        let mut errors = FieldErrors::new();
        for field in &session.dirty {
            let (Some(column), Some(value)) = (columns.get(field), session.pending.get(field)) else {
                continue;
            };
            if let Err(e) = column.validate(value) {
                errors.push(e);
            }
        }
        if !errors.is_empty() {
            log::debug!("[edit] row {} failed validation: {}", session.row_id, errors);
            return Err(EditError::ValidationFailed(errors));
        }

        let Some(session) = self.session.take() else {
            return Err(EditError::NoActiveEdit);
        };
        let merged = dataset
            .update(&session.row_id, |row| {
                for field in &session.dirty {
                    if let Some(value) = session.pending.get(field) {
                        row.insert(field.clone(), value.clone());
                    }
                }
            })
            .cloned()
            .ok_or_else(|| EditError::RowNotFound(session.row_id.clone()))?;

        log::debug!("[edit] commit row {} ({} fields)", session.row_id, session.dirty.len());
        Ok(merged)
    }

    /// Discards the session without touching the dataset.
    ///
    /// Returns the discarded session, if one was active.
    pub fn cancel(&mut self) -> Option<EditSession> {
        let session = self.session.take();
        if let Some(s) = &session {
            log::debug!("[edit] cancel row {}", s.row_id);
        }
        session
    }
}
