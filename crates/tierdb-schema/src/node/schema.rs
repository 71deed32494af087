use crate::{
    MAX_TABLE_NAME_LEN,
    error::ErrorTree,
    node::{TableDef, ValidateNode, VisitableNode},
    validate::validate_schema,
    visit::Visitor,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Schema
///
/// Named collection of user tables keyed by class identifier. Part tables
/// normally live nested under their master; a part bound explicitly with
/// `TableDef::bind_master` may also be registered at the top level.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Schema {
    pub name: String,
    tables: BTreeMap<String, TableDef>,
}

impl Schema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
        }
    }

    /// Register a table, re-binding its nested parts to its final state.
    /// Returns the previous definition with the same identifier, if any.
    pub fn insert(&mut self, mut def: TableDef) -> Option<TableDef> {
        def.rebind_parts();

        self.tables.insert(def.def.ident.clone(), def)
    }

    #[must_use]
    pub fn with_table(mut self, def: TableDef) -> Self {
        self.insert(def);
        self
    }

    #[must_use]
    pub fn get(&self, ident: &str) -> Option<&TableDef> {
        self.tables.get(ident)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Top-level tables in identifier order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }

    /// Every table, nested parts included.
    pub fn all_tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables
            .values()
            .flat_map(|t| std::iter::once(t).chain(t.parts.iter()))
    }

    /// Tables in an order where every master precedes its parts.
    #[must_use]
    pub fn declaration_order(&self) -> Vec<&TableDef> {
        let (parts, masters): (Vec<_>, Vec<_>) =
            self.all_tables().partition(|t| t.tier.is_part());

        masters.into_iter().chain(parts).collect()
    }

    /// Find the table whose physical name is `table_name`.
    #[must_use]
    pub fn find_by_table_name(&self, table_name: &str) -> Option<&TableDef> {
        self.all_tables()
            .find(|t| t.table_name().is_ok_and(|name| name == table_name))
    }

    /// Validate every node, then schema-wide invariants, with the default
    /// table name limit.
    pub fn validate(&self) -> Result<(), ErrorTree> {
        self.validate_with_max_len(MAX_TABLE_NAME_LEN)
    }

    /// Validate with physical names limited to `max_len` bytes.
    pub fn validate_with_max_len(&self, max_len: usize) -> Result<(), ErrorTree> {
        validate_schema(self, max_len)
    }
}

impl ValidateNode for Schema {}

impl VisitableNode for Schema {
    fn route_key(&self) -> String {
        String::new()
    }

    fn drive<V: Visitor>(&self, v: &mut V) {
        for table in self.tables.values() {
            table.accept(v);
        }
    }
}
