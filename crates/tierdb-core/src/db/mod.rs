//! The in-memory relational store behind a validated schema.

mod insert;
mod populate;
mod seed;
mod table;

#[cfg(test)]
mod tests;

pub use insert::{InsertOptions, InsertReport};
pub use populate::{Made, Populate, PopulateOptions, PopulateReport};
pub use table::TableStore;

use crate::{
    config::DbConfig,
    error::{ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent},
};
use std::collections::BTreeMap;
use tierdb_primitives::Row;
use tierdb_schema::{
    node::{Schema, TableDef},
    types::Tier,
};

///
/// Db
///
/// Owns a validated schema and one `TableStore` per declared table, keyed
/// by physical table name.
///

#[derive(Debug)]
pub struct Db {
    schema: Schema,
    config: DbConfig,
    tables: BTreeMap<String, TableStore>,
}

impl Db {
    /// Validate `schema`, declare every table (masters before parts), and
    /// seed lookup tables when `config.seed_lookups` is set.
    pub fn new(schema: Schema, config: DbConfig) -> Result<Self, InternalError> {
        schema
            .validate_with_max_len(config.max_table_name_len)
            .map_err(InternalError::schema_validation)?;

        let order: Vec<TableDef> = schema.declaration_order().into_iter().cloned().collect();
        let mut db = Self {
            schema,
            config,
            tables: BTreeMap::new(),
        };

        let mut declared = Vec::with_capacity(order.len());
        for def in order {
            declared.push(db.declare(def)?);
        }
        db.seed_declared(&declared)?;

        Ok(db)
    }

    /// Add one table (and its nested parts) to a running store.
    /// The whole schema is re-validated first; nothing changes on failure.
    pub fn add_table(&mut self, def: TableDef) -> Result<String, InternalError> {
        let mut schema = self.schema.clone();
        if schema.insert(def.clone()).is_some() {
            return Err(InternalError::conflict(
                ErrorOrigin::Schema,
                format!("table '{}' is already declared", def.def.ident),
            ));
        }
        schema
            .validate_with_max_len(self.config.max_table_name_len)
            .map_err(InternalError::schema_validation)?;

        let registered = schema
            .get(&def.def.ident)
            .cloned()
            .ok_or_else(|| InternalError::schema_invariant("table vanished during registration"))?;
        let new_tables: Vec<TableDef> = std::iter::once(registered.clone())
            .chain(registered.parts.iter().cloned())
            .collect();

        // check every name before touching the store
        for table in &new_tables {
            self.check_declarable(&table.table_name()?)?;
        }

        let previous = std::mem::replace(&mut self.schema, schema);
        let mut declared = Vec::with_capacity(new_tables.len());
        if let Err(err) = self.declare_and_seed(new_tables, &mut declared) {
            for name in &declared {
                self.tables.remove(name);
            }
            self.schema = previous;

            return Err(err);
        }

        Ok(registered.table_name()?)
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Physical names of all declared tables.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn table(&self, table: &str) -> Result<&TableStore, InternalError> {
        self.tables
            .get(table)
            .ok_or_else(|| InternalError::table_not_found(table))
    }

    /// Physical name of the table declared for class `ident`.
    pub fn table_name_of(&self, ident: &str) -> Result<String, InternalError> {
        let def = self
            .schema
            .get(ident)
            .ok_or_else(|| InternalError::table_not_found(ident))?;

        Ok(def.table_name()?)
    }

    /// All rows of `table` in primary-key order.
    pub fn fetch(&self, table: &str) -> Result<Vec<Row>, InternalError> {
        Ok(self.table(table)?.rows().cloned().collect())
    }

    pub fn len(&self, table: &str) -> Result<usize, InternalError> {
        Ok(self.table(table)?.len())
    }

    /// Whether `table` holds a row whose primary key matches `key`.
    pub fn contains_key(&self, table: &str, key: &Row) -> Result<bool, InternalError> {
        Ok(self.table(table)?.contains_key(key))
    }

    fn check_declarable(&self, name: &str) -> Result<(), InternalError> {
        if name.len() > self.config.max_table_name_len {
            return Err(InternalError::schema_invariant(format!(
                "table name '{name}' exceeds configured max length {}",
                self.config.max_table_name_len
            )));
        }
        if self.tables.contains_key(name) {
            return Err(InternalError::conflict(
                ErrorOrigin::Schema,
                format!("table '{name}' is already declared"),
            ));
        }

        Ok(())
    }

    // declare
    // register an empty store for one table; masters must come first
    fn declare(&mut self, def: TableDef) -> Result<String, InternalError> {
        let name = def.table_name()?;
        self.check_declarable(&name)?;

        let master = match &def.master {
            Some(master) if def.tier == Tier::Part => {
                let master_name = master.table_name()?;
                if !self.tables.contains_key(&master_name) {
                    return Err(InternalError::schema_invariant(format!(
                        "part table '{name}' declared before its master '{master_name}'"
                    )));
                }
                Some(master_name)
            }
            _ => None,
        };

        self.tables.insert(
            name.clone(),
            TableStore::new(name.clone(), def, master),
        );
        sink::record(MetricsEvent::TableDeclared {
            table: name.clone(),
        });

        Ok(name)
    }

    // declare_and_seed
    // names of tables declared so far are left in `declared` for rollback
    fn declare_and_seed(
        &mut self,
        tables: Vec<TableDef>,
        declared: &mut Vec<String>,
    ) -> Result<(), InternalError> {
        for table in tables {
            declared.push(self.declare(table)?);
        }

        self.seed_declared(declared)
    }

    fn seed_declared(&mut self, declared: &[String]) -> Result<(), InternalError> {
        if !self.config.seed_lookups {
            return Ok(());
        }

        for name in declared {
            if self.table(name)?.def().tier == Tier::Lookup {
                self.prepare_lookup(name)?;
            }
        }

        Ok(())
    }
}
