//! Query model: filter rules, sort, descriptors and views.
//!
//! # Shared Types
//!
//! - [`FilterRule`] - One field/operator/value condition, also the remote wire shape
//! - [`Sort`] - Single-field ordering with a [`Direction`]
//! - [`QueryDescriptor`] - Immutable snapshot of search, filters, sort and page
//! - [`ViewResult`] - The rows and count currently shown

mod descriptor;
mod filter;
mod order;
mod view;

pub use descriptor::DEFAULT_PAGE_SIZE;
pub use descriptor::QueryDescriptor;
pub use filter::FilterOperator;
pub use filter::FilterRule;
pub use filter::matches_all;
pub use order::Direction;
pub use order::Sort;
pub use view::ViewResult;
