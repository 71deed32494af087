//! Typed table declarations.
//!
//! A unit struct implementing `TableKind` stands for one user table; its
//! tier picks the naming policy. `PartKind` names its master as an
//! associated type, so the back-reference is fixed at compile time and
//! bound when the definition is built.

use tierdb_primitives::Row;
use tierdb_schema::{
    node::{Heading, NodeError, Schema, TableDef},
    types::Tier,
};

///
/// TableKind
///

pub trait TableKind {
    /// CamelCase class identifier.
    const IDENT: &'static str;
    const TIER: Tier;

    fn heading() -> Heading;

    /// Seed rows; only meaningful for Lookup tables.
    fn contents() -> Vec<Row> {
        Vec::new()
    }

    /// Unbound definitions of the nested part tables.
    fn parts() -> Vec<TableDef> {
        Vec::new()
    }

    #[must_use]
    fn definition() -> TableDef {
        TableDef::new(Self::IDENT, Self::TIER, Self::heading())
            .with_contents(Self::contents())
            .with_parts(Self::parts())
    }

    fn table_name() -> Result<String, NodeError> {
        Self::definition().table_name()
    }
}

///
/// PartKind
///

pub trait PartKind {
    type Master: TableKind;

    const IDENT: &'static str;

    fn heading() -> Heading;

    /// Definition without a master, for listing in `TableKind::parts`.
    #[must_use]
    fn unbound() -> TableDef {
        TableDef::part(Self::IDENT, Self::heading())
    }

    /// Definition bound to `Self::Master`.
    fn definition() -> Result<TableDef, NodeError> {
        let mut def = Self::unbound();
        def.bind_master(&<Self::Master as TableKind>::definition())?;

        Ok(def)
    }

    fn table_name() -> Result<String, NodeError> {
        Self::definition()?.table_name()
    }
}

///
/// SchemaExt
///

pub trait SchemaExt {
    #[must_use]
    fn with_kind<T: TableKind>(self) -> Self;
}

impl SchemaExt for Schema {
    fn with_kind<T: TableKind>(self) -> Self {
        self.with_table(T::definition())
    }
}

///
/// TESTS
///
