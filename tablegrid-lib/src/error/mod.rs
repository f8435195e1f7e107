//! Error types

mod dataset;
mod edit;
mod fetch;
mod field;
mod validation;

pub use dataset::*;
pub use edit::*;
pub use fetch::*;
pub use field::*;
pub use validation::*;

/// Any error surfaced by the table facade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Edit session failure.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// Dataset identity violation.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Column registry violation.
    #[error(transparent)]
    Column(#[from] ColumnError),

    /// Remote source failure.
    #[error("Fetch failed: {0}")]
    FetchFailed(#[from] FetchError),

    /// A remote operation was requested but the table has no remote source.
    #[error("No remote source configured")]
    NoRemoteSource,
}
