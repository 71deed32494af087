use crate::error::InternalError;
use std::collections::BTreeMap;
use tierdb_primitives::{Row, Value};
use tierdb_schema::node::{Heading, TableDef};

///
/// TableStore
///
/// Rows of one declared table, keyed by their primary-key projection.
///

#[derive(Clone, Debug)]
pub struct TableStore {
    name: String,
    def: TableDef,
    master: Option<String>,
    rows: BTreeMap<Row, Row>,
}

impl TableStore {
    pub(crate) const fn new(name: String, def: TableDef, master: Option<String>) -> Self {
        Self {
            name,
            def,
            master,
            rows: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn def(&self) -> &TableDef {
        &self.def
    }

    #[must_use]
    pub const fn heading(&self) -> &Heading {
        &self.def.heading
    }

    /// Physical name of the master table, for part tables.
    #[must_use]
    pub fn master(&self) -> Option<&str> {
        self.master.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project `row` onto this table's primary key.
    #[must_use]
    pub fn key_of(&self, row: &Row) -> Row {
        row.project(self.heading().primary_key_names())
    }

    /// Project `row` onto the primary key with values in their declared
    /// types; `None` if a key attribute is null or does not fit.
    #[must_use]
    pub fn canonical_key(&self, row: &Row) -> Option<Row> {
        self.heading()
            .primary_key
            .iter()
            .map(|attr| {
                let value = row.get(&attr.name)?.clone().coerce_to(attr.ty)?;
                (!value.is_null()).then(|| (attr.name.clone(), value))
            })
            .collect()
    }

    #[must_use]
    pub fn contains_key(&self, key: &Row) -> bool {
        self.canonical_key(key)
            .is_some_and(|key| self.rows.contains_key(&key))
    }

    /// Rows in primary-key order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    pub(crate) fn commit(&mut self, rows: impl IntoIterator<Item = (Row, Row)>) {
        self.rows.extend(rows);
    }

    ///
    /// normalize
    ///
    /// Check `row` against the heading and return it with every attribute
    /// present in its canonical type. Absent nullable attributes become
    /// `Null`; absent required attributes, null keys, unknown attributes,
    /// and type mismatches are errors.
    ///

    pub(crate) fn normalize(&self, row: Row) -> Result<Row, InternalError> {
        let heading = self.heading();

        if let Some(unknown) = row.keys().find(|name| heading.get(name).is_none()) {
            return Err(InternalError::insert_invariant(format!(
                "unknown attribute '{unknown}' for table '{}'",
                self.name
            )));
        }

        let mut row = row;
        let mut out = Row::new();
        for attr in heading.iter() {
            let value = row.remove(&attr.name).unwrap_or(Value::Null);

            if value.is_null() && (heading.is_key(&attr.name) || !attr.nullable) {
                return Err(InternalError::insert_invariant(format!(
                    "missing value for required attribute '{}' in table '{}'",
                    attr.name, self.name
                )));
            }

            let display = value.to_string();
            let value = value.coerce_to(attr.ty).ok_or_else(|| {
                InternalError::insert_invariant(format!(
                    "attribute '{}' in table '{}' expects {}, found {display}",
                    attr.name, self.name, attr.ty
                ))
            })?;

            out.insert(attr.name.clone(), value);
        }

        Ok(out)
    }
}

///
/// TESTS
///
