//! Selection and expansion state.
//!
//! Both are plain sets of row ids. They survive page, search, filter and sort
//! changes; ids that no longer exist in the canonical dataset stay recorded
//! but are ignored on read.

use std::collections::BTreeSet;
use std::collections::HashSet;

use crate::model::RowId;

/// How many rows may be selected at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Selection requests are ignored.
    None,
    /// Selecting a row deselects every other row.
    Single,
    /// Any number of rows.
    #[default]
    Multiple,
}

/// Which rows "select all" applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectAllScope {
    /// Only the rows of the page on screen.
    #[default]
    CurrentPage,
    /// Every row matching search and filters, across pages.
    AllMatched,
}

/// ID-based set of rows, used for both selection and expansion.
///
/// The set records exactly what it is told. Whether a row may be expanded,
/// or which ids "select all" covers, is the caller's decision.
///
/// # Example
///
/// ```
/// use tablegrid_lib::model::RowId;
/// use tablegrid_lib::selection::RowSet;
///
/// let mut selected = RowSet::new();
/// selected.select(&RowId::from("a"));
/// selected.select_all(&[RowId::from("b"), RowId::from("c")]);
/// assert_eq!(selected.len(), 3);
///
/// selected.deselect(&RowId::from("b"));
/// assert!(!selected.contains(&RowId::from("b")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    mode: SelectionMode,
    ids: HashSet<RowId>,
    /// Anchor for range selection (shift-click starting point).
    anchor: Option<RowId>,
}

impl RowSet {
    /// Creates an empty multi-row set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with the given mode.
    pub fn with_mode(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Check if an id is recorded, live or not.
    pub fn contains(&self, id: &RowId) -> bool {
        self.ids.contains(id)
    }

    /// Number of recorded ids, live or not.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Get the anchor id for range selection.
    pub fn anchor(&self) -> Option<&RowId> {
        self.anchor.as_ref()
    }

    /// Recorded ids accepted by `is_live`, sorted for deterministic output.
    pub fn live_ids(&self, is_live: impl Fn(&RowId) -> bool) -> BTreeSet<RowId> {
        self.ids.iter().filter(|id| is_live(id)).cloned().collect()
    }

    /// Add an id. In single mode every other id is dropped.
    ///
    /// Returns `true` if the set changed.
    pub fn select(&mut self, id: &RowId) -> bool {
        match self.mode {
            SelectionMode::None => false,
            SelectionMode::Single => {
                let changed = self.ids.len() != 1 || !self.ids.contains(id);
                self.ids.clear();
                self.ids.insert(id.clone());
                self.anchor = Some(id.clone());
                changed
            }
            SelectionMode::Multiple => {
                self.anchor = Some(id.clone());
                self.ids.insert(id.clone())
            }
        }
    }

    /// Remove an id. Returns `true` if it was present.
    pub fn deselect(&mut self, id: &RowId) -> bool {
        self.ids.remove(id)
    }

    /// Flip an id (ctrl-click behavior). Returns `true` if the set changed.
    pub fn toggle(&mut self, id: &RowId) -> bool {
        if self.ids.contains(id) {
            self.anchor = Some(id.clone());
            self.deselect(id)
        } else {
            self.select(id)
        }
    }

    /// Add every id in `ids`. Ignored outside multiple mode.
    ///
    /// Returns the ids that were newly added.
    pub fn select_all(&mut self, ids: &[RowId]) -> Vec<RowId> {
        if self.mode != SelectionMode::Multiple {
            return Vec::new();
        }
        ids.iter()
            .filter(|id| self.ids.insert((*id).clone()))
            .cloned()
            .collect()
    }

    /// Range select from the anchor to `target` (shift-click behavior).
    ///
    /// `ordered` is the display order of the candidate ids. If `extend` is
    /// false, ids outside the range are dropped first. Falls back to a plain
    /// select when the anchor or target is not in `ordered`.
    ///
    /// Returns (added, removed) ids.
    pub fn range_select(
        &mut self,
        target: &RowId,
        ordered: &[RowId],
        extend: bool,
    ) -> (Vec<RowId>, Vec<RowId>) {
        if self.mode != SelectionMode::Multiple {
            let added = if self.select(target) { vec![target.clone()] } else { vec![] };
            return (added, vec![]);
        }

        let anchor = self.anchor.clone().unwrap_or_else(|| target.clone());
        let anchor_pos = ordered.iter().position(|id| id == &anchor);
        let target_pos = ordered.iter().position(|id| id == target);

        let (start, end) = match (anchor_pos, target_pos) {
            (Some(a), Some(t)) => (a.min(t), a.max(t)),
            _ => {
                let added = if self.select(target) { vec![target.clone()] } else { vec![] };
                return (added, vec![]);
            }
        };

        let range: HashSet<&RowId> = ordered[start..=end].iter().collect();

        let mut removed = Vec::new();
        if !extend {
            removed = self
                .ids
                .iter()
                .filter(|id| !range.contains(id))
                .cloned()
                .collect();
            for id in &removed {
                self.ids.remove(id);
            }
        }

        let added = ordered[start..=end]
            .iter()
            .filter(|id| self.ids.insert((*id).clone()))
            .cloned()
            .collect();

        (added, removed)
    }

    /// Drop every id. Returns the ids that were removed.
    pub fn clear(&mut self) -> Vec<RowId> {
        self.anchor = None;
        self.ids.drain().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<RowId> {
        names.iter().map(|n| RowId::from(*n)).collect()
    }

    #[test]
    fn test_select_all_records_only_given_ids() {
        let mut set = RowSet::new();
        let added = set.select_all(&ids(&["a", "b"]));
        assert_eq!(added, ids(&["a", "b"]));
        assert_eq!(set.len(), 2);
        assert!(set.select_all(&ids(&["a"])).is_empty());
    }

    #[test]
    fn test_single_mode_replaces() {
        let mut set = RowSet::with_mode(SelectionMode::Single);
        assert!(set.select(&RowId::from("a")));
        assert!(set.select(&RowId::from("b")));
        assert!(!set.select(&RowId::from("b")));
        assert_eq!(set.live_ids(|_| true), ids(&["b"]).into_iter().collect());
        assert!(set.select_all(&ids(&["c", "d"])).is_empty());
    }

    #[test]
    fn test_none_mode_ignores_selection() {
        let mut set = RowSet::with_mode(SelectionMode::None);
        assert!(!set.select(&RowId::from("a")));
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut set = RowSet::new();
        assert!(set.toggle(&RowId::from("a")));
        assert!(set.contains(&RowId::from("a")));
        assert!(set.toggle(&RowId::from("a")));
        assert!(set.is_empty());
    }

    #[test]
    fn test_range_select() {
        let order = ids(&["a", "b", "c", "d", "e"]);
        let mut set = RowSet::new();
        set.select(&RowId::from("b"));
        set.select(&RowId::from("e"));
        set.select(&RowId::from("b"));

        let (added, removed) = set.range_select(&RowId::from("d"), &order, false);
        assert_eq!(added, ids(&["c", "d"]));
        assert_eq!(removed, ids(&["e"]));
        assert_eq!(set.live_ids(|_| true), ids(&["b", "c", "d"]).into_iter().collect());
    }

    #[test]
    fn test_live_ids_filters_dead_rows() {
        let mut set = RowSet::new();
        set.select_all(&ids(&["a", "gone"]));
        let live = set.live_ids(|id| id.as_str() != "gone");
        assert_eq!(live, ids(&["a"]).into_iter().collect());
        assert_eq!(set.len(), 2);
    }
}
