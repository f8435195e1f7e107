//! Row, value and column models

mod column;
mod dataset;
mod row;
mod value;

pub use column::*;
pub use dataset::*;
pub use row::*;
pub use value::*;
