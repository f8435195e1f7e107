//! Sort order for the visible rows.

use serde::Deserialize;
use serde::Serialize;

/// Sort direction. `None` leaves rows in dataset order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
    #[default]
    None,
}

impl Direction {
    /// Next direction when a sortable header is clicked: asc, desc, none.
    pub fn cycle(self) -> Self {
        match self {
            Direction::None => Direction::Asc,
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::None,
        }
    }
}

/// Single-field ordering of the visible rows.
///
/// # Example
///
/// ```
/// use tablegrid_lib::query::{Direction, Sort};
///
/// let sort = Sort::desc("price");
/// assert!(sort.is_active());
/// assert!(!Sort::none().is_active());
/// assert_eq!(sort.toggled("price").direction, Direction::None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    /// No ordering.
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates an ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    /// Creates a descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    /// Returns `true` if rows are reordered.
    pub fn is_active(&self) -> bool {
        self.direction != Direction::None && !self.field.is_empty()
    }

    /// Header-click behavior: cycles the direction on the same field, or
    /// starts ascending on a different one.
    pub fn toggled(&self, field: &str) -> Self {
        if self.field == field {
            let direction = self.direction.cycle();
            if direction == Direction::None {
                return Self::none();
            }
            Self {
                field: self.field.clone(),
                direction,
            }
        } else {
            Self::asc(field)
        }
    }
}
