//! ## Crate layout
//! - `core`: the relational store, lookup seeding, population, and observability.
//! - `schema`: table tiers, naming, part/master binding, and validation.
//! - `primitives`: values, rows, and attribute types.
//! - `utils`: case conversion for class identifiers.
//! - `traits`: typed `TableKind` / `PartKind` declarations.
//! - `error`: public error type with a stable kind + origin taxonomy.

pub use tierdb_core as core;
pub use tierdb_primitives as primitives;
pub use tierdb_schema as schema;
pub use tierdb_utils as utils;

pub mod error;
pub mod traits;

pub use error::Error;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse lookup contents kept as a json array of objects.
pub fn contents_from_json(json: &str) -> Result<Vec<primitives::Row>, Error> {
    Ok(primitives::rows_from_json(json)?)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        core::{
            config::DbConfig,
            db::{Db, InsertOptions, InsertReport, Made, Populate, PopulateOptions, PopulateReport},
        },
        primitives::{AttributeType, Row, Value},
        schema::{
            node::{Heading, MasterRef, Schema, TableDef},
            types::{TableName, Tier},
        },
        traits::{PartKind as _, SchemaExt as _, TableKind as _},
    };
}
