use crate::{
    db::{Db, InsertOptions, insert::display_key},
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent, PopulateOutcome},
};
use std::collections::{BTreeMap, BTreeSet};
use tierdb_primitives::Row;

///
/// Populate
///
/// Contract for filling an Imported or Computed table. `key_source` lists
/// the keys the table should cover; `make` produces the rows for one key
/// that is not covered yet.
///

pub trait Populate {
    /// Candidate keys. Attributes outside the target's primary key are ignored.
    fn key_source(&self, db: &Db) -> Result<Vec<Row>, InternalError>;

    /// Rows for one missing key, for the target and any of its parts.
    fn make(&self, key: &Row, db: &Db) -> Result<Made, InternalError>;
}

///
/// Made
///
/// Output of one `make` call. Part rows are grouped by the part's class
/// identifier.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Made {
    pub rows: Vec<Row>,
    pub parts: BTreeMap<String, Vec<Row>>,
}

impl Made {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    #[must_use]
    pub fn part(mut self, ident: impl Into<String>, row: Row) -> Self {
        self.parts.entry(ident.into()).or_default().push(row);
        self
    }
}

///
/// PopulateOptions
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PopulateOptions {
    /// Record per-key failures in the report instead of aborting.
    pub suppress_errors: bool,

    /// Stop after this many `make` calls.
    pub max_calls: Option<usize>,
}

///
/// PopulateReport
///

#[derive(Debug, Default)]
pub struct PopulateReport {
    pub made: usize,
    pub skipped: usize,
    pub errors: Vec<(Row, InternalError)>,
}

impl PopulateReport {
    #[must_use]
    pub const fn calls(&self) -> usize {
        self.made + self.errors.len()
    }
}

impl Db {
    ///
    /// populate
    ///
    /// Call `make` for every key from `key_source` that `table` does not
    /// cover yet. Each key's rows (target plus parts) are committed
    /// together or not at all, so an interrupted run can simply be
    /// repeated.
    ///

    pub fn populate<P: Populate + ?Sized>(
        &mut self,
        table: &str,
        populator: &P,
        options: PopulateOptions,
    ) -> Result<PopulateReport, InternalError> {
        let tier = self.table(table)?.def().tier;
        if !tier.is_auto_populated() {
            return Err(InternalError::unsupported(
                ErrorOrigin::Populate,
                format!(
                    "table '{table}' is a {tier} table; only imported and computed tables can be populated"
                ),
            ));
        }

        let keys = self.resolve_keys(table, populator.key_source(self)?)?;
        let mut report = PopulateReport::default();

        for key in keys {
            if options.max_calls.is_some_and(|max| report.calls() >= max) {
                break;
            }

            if self.covers(table, &key)? {
                report.skipped += 1;
                record(table, PopulateOutcome::Skipped);
                continue;
            }

            match self.make_one(table, &key, populator) {
                Ok(()) => {
                    report.made += 1;
                    record(table, PopulateOutcome::Made);
                }
                Err(err) => {
                    record(table, PopulateOutcome::Failed);
                    if !options.suppress_errors {
                        return Err(err);
                    }
                    report.errors.push((key, err));
                }
            }
        }

        Ok(report)
    }

    /// Keys from the source not yet covered by `table`.
    pub fn pending_keys<P: Populate + ?Sized>(
        &self,
        table: &str,
        populator: &P,
    ) -> Result<Vec<Row>, InternalError> {
        let keys = self.resolve_keys(table, populator.key_source(self)?)?;

        let mut pending = Vec::new();
        for key in keys {
            if !self.covers(table, &key)? {
                pending.push(key);
            }
        }

        Ok(pending)
    }

    // resolve_keys
    // project source rows onto the target's key attributes they carry
    fn resolve_keys(&self, table: &str, source: Vec<Row>) -> Result<BTreeSet<Row>, InternalError> {
        let store = self.table(table)?;
        let heading = store.heading();

        source
            .into_iter()
            .map(|row| {
                let mut key = Row::new();
                for attr in &heading.primary_key {
                    let Some(value) = row.get(&attr.name) else {
                        continue;
                    };
                    let value = value
                        .clone()
                        .coerce_to(attr.ty)
                        .filter(|v| !v.is_null())
                        .ok_or_else(|| {
                            populate_invariant(format!(
                                "key source value {value} for '{}' does not fit {}",
                                attr.name, attr.ty
                            ))
                        })?;
                    key.insert(attr.name.clone(), value);
                }

                if key.is_empty() {
                    return Err(populate_invariant(format!(
                        "key source row shares no primary key attribute with table '{table}'"
                    )));
                }

                Ok(key)
            })
            .collect()
    }

    // covers
    // a (possibly partial) key is covered when any stored row agrees with it
    fn covers(&self, table: &str, key: &Row) -> Result<bool, InternalError> {
        let store = self.table(table)?;

        if key.len() == store.heading().primary_key.len() {
            return Ok(store.contains_key(key));
        }

        Ok(store.rows().any(|row| agrees(row, key)))
    }

    fn make_one<P: Populate + ?Sized>(
        &mut self,
        table: &str,
        key: &Row,
        populator: &P,
    ) -> Result<(), InternalError> {
        let made = populator.make(key, self)?;
        let options = InsertOptions::default().allow_direct_insert();

        let target = self.plan_insert(table, made.rows, options, &BTreeSet::new())?;
        if let Some((row_key, _)) = target.rows.iter().find(|(row_key, _)| !agrees(row_key, key)) {
            return Err(populate_invariant(format!(
                "make for {} produced row {} outside its key",
                display_key(key),
                display_key(row_key)
            )));
        }

        let pending: BTreeSet<Row> = target.keys().cloned().collect();
        let mut plans = vec![target];
        for (ident, rows) in made.parts {
            let part_table = self.part_table_name(table, &ident)?;
            plans.push(self.plan_insert(&part_table, rows, options, &pending)?);
        }

        for plan in plans {
            self.apply(plan);
        }

        Ok(())
    }

    fn part_table_name(&self, master: &str, ident: &str) -> Result<String, InternalError> {
        let store = self.table(master)?;
        let part = store
            .def()
            .parts
            .iter()
            .find(|p| p.def.ident == ident)
            .ok_or_else(|| {
                populate_invariant(format!("table '{master}' has no part '{ident}'"))
            })?;

        Ok(part.table_name()?)
    }
}

fn agrees(row: &Row, key: &Row) -> bool {
    key.iter().all(|(name, value)| row.get(name) == Some(value))
}

fn record(table: &str, outcome: PopulateOutcome) {
    sink::record(MetricsEvent::PopulateKey {
        table: table.to_string(),
        outcome,
    });
}

fn populate_invariant(message: String) -> InternalError {
    InternalError::new(ErrorClass::InvariantViolation, ErrorOrigin::Populate, message)
}
