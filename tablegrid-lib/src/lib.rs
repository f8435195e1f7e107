//! Tabular data engine
//!
//! Holds the canonical rows of a data table and derives the visible page from
//! a [`QueryDescriptor`](query::QueryDescriptor): search text, filter rules,
//! single-field sort and pagination. Evaluation happens in-process over the
//! full dataset (local mode) or is delegated to a
//! [`RemoteSource`](remote::RemoteSource) one page at a time (remote mode).
//!
//! On top of that the engine tracks a single-row inline edit session, row
//! selection and expansion by id, and the column registry (visibility and
//! frozen columns). Rendering is left to the caller.

pub mod columns;
pub mod config;
pub mod controller;
pub mod edit;
pub mod error;
pub mod eval;
pub mod model;
pub mod query;
pub mod remote;
pub mod selection;
pub mod table;

pub use config::TableConfig;
pub use controller::Dispatch;
pub use controller::FetchStatus;
pub use controller::Mode;
pub use table::DataTable;
pub use table::TableListener;
