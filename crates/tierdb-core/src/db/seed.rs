use crate::{
    db::{Db, InsertOptions, InsertReport},
    error::{ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent},
};
use tierdb_schema::types::Tier;

impl Db {
    ///
    /// prepare_lookup
    ///
    /// Insert a lookup table's declared `contents`, skipping rows that are
    /// already present. Running it again is a no-op; a lookup without
    /// contents inserts nothing.
    ///

    pub fn prepare_lookup(&mut self, table: &str) -> Result<InsertReport, InternalError> {
        let store = self.table(table)?;
        let tier = store.def().tier;

        if tier != Tier::Lookup {
            return Err(InternalError::unsupported(
                ErrorOrigin::Insert,
                format!("table '{table}' is a {tier} table; only lookup tables have contents"),
            ));
        }

        let contents = store.def().contents.clone();
        if contents.is_empty() {
            return Ok(InsertReport::default());
        }

        let report = self.insert(table, contents, InsertOptions::skip_duplicates())?;
        sink::record(MetricsEvent::LookupSeeded {
            table: table.to_string(),
            inserted: report.inserted,
            skipped: report.skipped,
        });

        Ok(report)
    }
}
