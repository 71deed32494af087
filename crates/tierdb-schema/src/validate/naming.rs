use crate::{err, error::ErrorTree, node::Schema};
use std::collections::BTreeMap;

/// Physical names must be unique across the schema and at most `max_len` bytes.
pub fn validate_table_naming(schema: &Schema, max_len: usize, errs: &mut ErrorTree) {
    let mut by_name: BTreeMap<String, String> = BTreeMap::new();

    for table in schema.all_tables() {
        // unnamed tables are already reported by node validation
        let Ok(name) = table.table_name() else {
            continue;
        };
        let ident = table.def.ident.clone();

        if name.len() > max_len {
            err!(errs, "table name '{name}' for '{ident}' exceeds max length {max_len}");
        }

        if let Some(prev) = by_name.insert(name.clone(), ident.clone()) {
            err!(errs, "duplicate table name '{name}' for '{prev}' and '{ident}'");
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MAX_TABLE_NAME_LEN,
        node::{Heading, TableDef},
    };
    use tierdb_primitives::AttributeType;

    fn heading() -> Heading {
        Heading::new().key("id", AttributeType::Int)
    }

    #[test]
    fn distinct_tiers_do_not_collide() {
        let schema = Schema::new("lab")
            .with_table(TableDef::manual("Scan", heading()))
            .with_table(TableDef::computed("ScanStats", heading()));

        let mut errs = ErrorTree::new();
        validate_table_naming(&schema, MAX_TABLE_NAME_LEN, &mut errs);

        assert!(errs.is_empty());
    }

    #[test]
    fn duplicate_parts_collide() {
        let schema = Schema::new("lab").with_table(
            TableDef::manual("A", heading())
                .with_parts([TableDef::part("B", heading()), TableDef::part("B", heading())]),
        );

        let mut errs = ErrorTree::new();
        validate_table_naming(&schema, MAX_TABLE_NAME_LEN, &mut errs);

        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn long_names_are_rejected() {
        let ident = format!("A{}", "b".repeat(MAX_TABLE_NAME_LEN));
        let schema = Schema::new("lab").with_table(TableDef::manual(ident, heading()));

        let mut errs = ErrorTree::new();
        validate_table_naming(&schema, MAX_TABLE_NAME_LEN, &mut errs);

        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn length_limit_is_configurable() {
        let ident = format!("A{}", "b".repeat(MAX_TABLE_NAME_LEN + 8));
        let schema = Schema::new("lab").with_table(TableDef::manual(ident, heading()));

        let mut errs = ErrorTree::new();
        validate_table_naming(&schema, 128, &mut errs);
        assert!(errs.is_empty());

        validate_table_naming(&schema, 16, &mut errs);
        assert_eq!(errs.len(), 1);
    }
}
