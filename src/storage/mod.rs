pub mod column;
pub mod table;

pub use column::{AnyColumn, Column};
pub use table::Table;
