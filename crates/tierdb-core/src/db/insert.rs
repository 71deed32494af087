use crate::{
    db::Db,
    error::{ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent},
};
use std::collections::BTreeSet;
use tierdb_primitives::Row;

///
/// InsertOptions
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InsertOptions {
    /// Silently drop rows whose primary key is already present.
    pub skip_duplicates: bool,

    /// Permit inserting into Imported/Computed tables outside `populate`.
    pub allow_direct_insert: bool,
}

impl InsertOptions {
    #[must_use]
    pub const fn skip_duplicates() -> Self {
        Self {
            skip_duplicates: true,
            allow_direct_insert: false,
        }
    }

    #[must_use]
    pub const fn allow_direct_insert(mut self) -> Self {
        self.allow_direct_insert = true;
        self
    }
}

///
/// InsertReport
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InsertReport {
    pub inserted: u64,
    pub skipped: u64,
}

///
/// InsertPlan
/// fully validated rows for one table, ready to commit
///

#[derive(Debug)]
pub(crate) struct InsertPlan {
    pub table: String,
    pub rows: Vec<(Row, Row)>,
    pub skipped: u64,
}

impl InsertPlan {
    pub(crate) fn keys(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().map(|(key, _)| key)
    }
}

impl Db {
    ///
    /// insert
    ///
    /// Insert `rows` into `table` atomically: if any row fails, nothing is
    /// written. Rows whose key is already stored (or repeated earlier in
    /// the batch) are a conflict unless `skip_duplicates` is set. Part
    /// rows require their master row to exist.
    ///

    pub fn insert(
        &mut self,
        table: &str,
        rows: impl IntoIterator<Item = Row>,
        options: InsertOptions,
    ) -> Result<InsertReport, InternalError> {
        let plan = self.plan_insert(table, rows, options, &BTreeSet::new())?;

        Ok(self.apply(plan))
    }

    /// Insert a single row with default options.
    pub fn insert1(&mut self, table: &str, row: Row) -> Result<InsertReport, InternalError> {
        self.insert(table, [row], InsertOptions::default())
    }

    // plan_insert
    // `pending_masters` holds master keys committed in the same unit of work
    pub(crate) fn plan_insert(
        &self,
        table: &str,
        rows: impl IntoIterator<Item = Row>,
        options: InsertOptions,
        pending_masters: &BTreeSet<Row>,
    ) -> Result<InsertPlan, InternalError> {
        let store = self.table(table)?;

        // parts of auto-populated masters are filled by the master's make
        let populated_by = match &store.def().master {
            Some(master) => master.tier,
            None => store.def().tier,
        };
        if populated_by.is_auto_populated() && !options.allow_direct_insert {
            return Err(InternalError::unsupported(
                ErrorOrigin::Insert,
                format!(
                    "direct insert into {populated_by} table '{table}' is not allowed; use populate"
                ),
            ));
        }

        let master = store.master().map(|name| self.table(name)).transpose()?;

        let mut seen = BTreeSet::new();
        let mut planned = Vec::new();
        let mut skipped = 0u64;

        for row in rows {
            let row = store.normalize(row)?;
            let key = store.key_of(&row);

            if store.contains_key(&key) || seen.contains(&key) {
                if options.skip_duplicates {
                    skipped += 1;
                    continue;
                }

                return Err(InternalError::conflict(
                    ErrorOrigin::Insert,
                    format!("duplicate entry {} in table '{table}'", display_key(&key)),
                ));
            }

            if let Some(master) = master {
                let master_key = master.key_of(&row);
                if !master.contains_key(&master_key) && !pending_masters.contains(&master_key) {
                    return Err(InternalError::conflict(
                        ErrorOrigin::Insert,
                        format!(
                            "foreign key violation: part table '{table}' references missing {} in master '{}'",
                            display_key(&master_key),
                            master.name()
                        ),
                    ));
                }
            }

            seen.insert(key.clone());
            planned.push((key, row));
        }

        Ok(InsertPlan {
            table: table.to_string(),
            rows: planned,
            skipped,
        })
    }

    // apply
    // commit a plan produced against the current state
    pub(crate) fn apply(&mut self, plan: InsertPlan) -> InsertReport {
        let report = InsertReport {
            inserted: plan.rows.len() as u64,
            skipped: plan.skipped,
        };

        if let Some(store) = self.tables.get_mut(&plan.table) {
            store.commit(plan.rows);
        }
        sink::record(MetricsEvent::Insert {
            table: plan.table,
            inserted: report.inserted,
            skipped: report.skipped,
        });

        report
    }
}

pub(crate) fn display_key(key: &Row) -> String {
    let parts: Vec<String> = key.iter().map(|(name, value)| format!("{name}={value}")).collect();

    format!("({})", parts.join(", "))
}
