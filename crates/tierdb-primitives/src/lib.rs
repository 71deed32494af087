//! Shared value vocabulary for TierDB: attribute types, scalar values, and rows.

mod json;
mod row;
mod value;

pub use json::{JsonValueError, rows_from_json};
pub use row::Row;
pub use value::{AttributeType, Value};
