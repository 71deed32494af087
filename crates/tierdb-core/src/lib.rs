//! Core runtime for TierDB: the in-memory relational store, lookup
//! seeding, auto-population, configuration, and observability.

pub mod config;
pub mod db;
pub mod error;
pub mod obs;

pub use error::InternalError as Error;

///
/// Prelude
///
/// Domain vocabulary only; errors and observability stay one module down.
///

pub mod prelude {
    pub use crate::{
        config::DbConfig,
        db::{Db, InsertOptions, InsertReport, Made, Populate, PopulateOptions, PopulateReport},
    };
    pub use tierdb_primitives::{AttributeType, Row, Value};
    pub use tierdb_schema::prelude::{Heading, Schema, TableDef, Tier};
}
