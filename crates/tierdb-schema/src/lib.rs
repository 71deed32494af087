//! Schema layer: table tiers, physical naming, part/master binding, and
//! whole-schema validation.

pub mod error;
pub mod node;
pub mod types;
pub mod validate;
pub mod visit;

/// Default maximum length for physical table names.
pub const MAX_TABLE_NAME_LEN: usize = 64;

/// Separator placed between a master's table name and a part's segment.
pub const PART_SEPARATOR: &str = "__";

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::ErrorTree,
        node::*,
        types::{TableName, Tier},
        visit::Visitor,
    };
    pub use serde::{Deserialize, Serialize};
    pub use tierdb_primitives::{AttributeType, Row, Value};
}
