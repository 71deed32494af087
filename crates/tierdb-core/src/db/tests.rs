use super::*;
use crate::{
    error::{ErrorClass, ErrorOrigin},
    obs::{MetricsEvent, MetricsSink, with_metrics_sink},
};
use std::{cell::RefCell, rc::Rc};
use tierdb_primitives::{AttributeType, Value};
use tierdb_schema::node::Heading;

fn species() -> TableDef {
    TableDef::lookup(
        "Species",
        Heading::new()
            .key("species", AttributeType::Text)
            .attr("legs", AttributeType::Uint),
    )
    .with_contents([
        Row::new().with("species", "mouse").with("legs", 4),
        Row::new().with("species", "fly").with("legs", 6),
    ])
}

fn session() -> TableDef {
    TableDef::manual(
        "Session",
        Heading::new()
            .key("session_id", AttributeType::Uint)
            .attr("species", AttributeType::Text),
    )
    .with_parts([TableDef::part(
        "Note",
        Heading::new()
            .key("session_id", AttributeType::Uint)
            .key("note_id", AttributeType::Uint)
            .attr("text", AttributeType::Text),
    )])
}

fn activity() -> TableDef {
    TableDef::computed(
        "Activity",
        Heading::new()
            .key("session_id", AttributeType::Uint)
            .attr("score", AttributeType::Int),
    )
    .with_parts([TableDef::part(
        "Bin",
        Heading::new()
            .key("session_id", AttributeType::Uint)
            .key("bin", AttributeType::Uint)
            .attr("count", AttributeType::Uint),
    )])
}

fn db() -> Db {
    let schema = Schema::new("lab")
        .with_table(species())
        .with_table(session())
        .with_table(activity());

    Db::new(schema, DbConfig::default()).unwrap()
}

fn add_sessions(db: &mut Db, ids: &[u64]) {
    let rows = ids
        .iter()
        .map(|id| Row::new().with("session_id", *id).with("species", "mouse"));
    db.insert("session", rows, InsertOptions::default()).unwrap();
}

///
/// ActivityMaker
/// scores each session by its id and emits `id` bins
///

struct ActivityMaker {
    fail_on: Option<u64>,
}

impl Populate for ActivityMaker {
    fn key_source(&self, db: &Db) -> Result<Vec<Row>, InternalError> {
        db.fetch("session")
    }

    fn make(&self, key: &Row, _: &Db) -> Result<Made, InternalError> {
        let Some(Value::Uint(id)) = key.get("session_id").cloned() else {
            return Err(InternalError::new(
                ErrorClass::Internal,
                ErrorOrigin::Populate,
                "key without session_id",
            ));
        };
        if self.fail_on == Some(id) {
            return Err(InternalError::new(
                ErrorClass::Internal,
                ErrorOrigin::Populate,
                format!("session {id} failed"),
            ));
        }

        let mut made = Made::new().row(
            Row::new()
                .with("session_id", id)
                .with("score", i64::try_from(id).unwrap_or_default() * 10),
        );
        for bin in 0..id {
            made = made.part(
                "Bin",
                Row::new()
                    .with("session_id", id)
                    .with("bin", bin)
                    .with("count", bin * 2),
            );
        }

        Ok(made)
    }
}

//
// declaration + seeding
//

#[test]
fn declares_every_table_by_physical_name() {
    let db = db();
    let names: Vec<_> = db.table_names().collect();

    assert_eq!(
        names,
        ["#species", "__activity", "__activity__bin", "session", "session__note"]
    );
    assert_eq!(db.table("session__note").unwrap().master(), Some("session"));
    assert_eq!(db.table_name_of("Species").unwrap(), "#species");
}

#[test]
fn lookup_contents_are_seeded_on_construction() {
    let db = db();
    let rows = db.fetch("#species").unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("species"), Some(&Value::from("fly")));
    assert_eq!(rows[0].get("legs"), Some(&Value::Uint(6)));
}

#[test]
fn reseeding_a_lookup_is_a_noop() {
    let mut db = db();
    let report = db.prepare_lookup("#species").unwrap();

    assert_eq!(report, InsertReport { inserted: 0, skipped: 2 });
    assert_eq!(db.len("#species").unwrap(), 2);
}

#[test]
fn seeding_can_be_disabled_and_run_later() {
    let schema = Schema::new("lab").with_table(species());
    let mut db = Db::new(schema, DbConfig::default().with_seed_lookups(false)).unwrap();
    assert_eq!(db.len("#species").unwrap(), 0);

    let report = db.prepare_lookup("#species").unwrap();
    assert_eq!(report.inserted, 2);
}

#[test]
fn prepare_lookup_rejects_other_tiers() {
    let mut db = db();
    let err = db.prepare_lookup("session").unwrap_err();

    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn invalid_schema_is_rejected() {
    let schema = Schema::new("lab").with_table(TableDef::part(
        "Loose",
        Heading::new().key("id", AttributeType::Int),
    ));
    let err = Db::new(schema, DbConfig::default()).unwrap_err();

    assert_eq!(err.origin, ErrorOrigin::Schema);
    assert!(err.message.contains("Loose"));
}

#[test]
fn configured_name_limit_applies() {
    let schema = Schema::new("lab").with_table(session());
    let err = Db::new(schema, DbConfig::default().with_max_table_name_len(8)).unwrap_err();

    assert!(err.message.contains("session__note"));
}

#[test]
fn configured_name_limit_can_exceed_default() {
    let ident = format!("A{}", "b".repeat(71));
    let long = TableDef::manual(ident, Heading::new().key("id", AttributeType::Uint));
    let schema = Schema::new("lab").with_table(long);

    assert!(Db::new(schema.clone(), DbConfig::default()).is_err());

    let db = Db::new(schema, DbConfig::default().with_max_table_name_len(128)).unwrap();
    assert_eq!(db.table_names().next().map(str::len), Some(72));
}

//
// insert
//

#[test]
fn duplicate_insert_conflicts_unless_skipped() {
    let mut db = db();
    add_sessions(&mut db, &[1]);

    let dup = Row::new().with("session_id", 1).with("species", "fly");
    let err = db.insert1("session", dup.clone()).unwrap_err();
    assert!(err.is_conflict());

    let report = db
        .insert("session", [dup], InsertOptions::skip_duplicates())
        .unwrap();
    assert_eq!(report, InsertReport { inserted: 0, skipped: 1 });

    // original row untouched
    let rows = db.fetch("session").unwrap();
    assert_eq!(rows[0].get("species"), Some(&Value::from("mouse")));
}

#[test]
fn failed_batch_writes_nothing() {
    let mut db = db();
    let rows = [
        Row::new().with("session_id", 1).with("species", "mouse"),
        Row::new().with("session_id", 1).with("species", "fly"),
    ];

    assert!(db.insert("session", rows, InsertOptions::default()).is_err());
    assert_eq!(db.len("session").unwrap(), 0);
}

#[test]
fn part_rows_require_master_row() {
    let mut db = db();
    let note = Row::new()
        .with("session_id", 3)
        .with("note_id", 1)
        .with("text", "ok");

    let err = db.insert1("session__note", note.clone()).unwrap_err();
    assert!(err.message.contains("foreign key"));

    add_sessions(&mut db, &[3]);
    db.insert1("session__note", note).unwrap();
    assert!(db
        .contains_key("session__note", &Row::new().with("session_id", 3).with("note_id", 1))
        .unwrap());
}

#[test]
fn direct_insert_into_computed_is_rejected() {
    let mut db = db();
    let row = Row::new().with("session_id", 1).with("score", 1);

    let err = db.insert1("__activity", row.clone()).unwrap_err();
    assert_eq!(err.class, ErrorClass::Unsupported);

    let bin = Row::new().with("session_id", 1).with("bin", 0).with("count", 0);
    let err = db.insert1("__activity__bin", bin).unwrap_err();
    assert_eq!(err.class, ErrorClass::Unsupported);

    db.insert(
        "__activity",
        [row],
        InsertOptions::default().allow_direct_insert(),
    )
    .unwrap();
}

#[test]
fn unknown_table_is_not_found() {
    let mut db = db();

    assert!(db.insert1("nope", Row::new()).unwrap_err().is_not_found());
    assert!(db.fetch("nope").unwrap_err().is_not_found());
}

//
// populate
//

#[test]
fn populate_makes_missing_keys_with_parts() {
    let mut db = db();
    add_sessions(&mut db, &[1, 2, 3]);

    let report = db
        .populate("__activity", &ActivityMaker { fail_on: None }, PopulateOptions::default())
        .unwrap();

    assert_eq!(report.made, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(db.len("__activity").unwrap(), 3);
    assert_eq!(db.len("__activity__bin").unwrap(), 1 + 2 + 3);
}

#[test]
fn populate_is_idempotent() {
    let mut db = db();
    add_sessions(&mut db, &[1, 2]);
    let maker = ActivityMaker { fail_on: None };

    db.populate("__activity", &maker, PopulateOptions::default()).unwrap();
    add_sessions(&mut db, &[5]);
    let report = db.populate("__activity", &maker, PopulateOptions::default()).unwrap();

    assert_eq!(report.made, 1);
    assert_eq!(report.skipped, 2);
    assert!(db.pending_keys("__activity", &maker).unwrap().is_empty());
}

#[test]
fn populate_failure_aborts_or_is_collected() {
    let mut db = db();
    add_sessions(&mut db, &[1, 2, 3]);
    let maker = ActivityMaker { fail_on: Some(2) };

    let err = db
        .populate("__activity", &maker, PopulateOptions::default())
        .unwrap_err();
    assert!(err.message.contains("session 2 failed"));
    assert_eq!(db.len("__activity").unwrap(), 1);

    let report = db
        .populate(
            "__activity",
            &maker,
            PopulateOptions {
                suppress_errors: true,
                ..PopulateOptions::default()
            },
        )
        .unwrap();
    assert_eq!(report.made, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].0, Row::new().with("session_id", 2u64));
    // failed key left no part rows behind
    assert_eq!(db.len("__activity__bin").unwrap(), 1 + 3);
}

#[test]
fn populate_respects_max_calls() {
    let mut db = db();
    add_sessions(&mut db, &[1, 2, 3]);

    let report = db
        .populate(
            "__activity",
            &ActivityMaker { fail_on: None },
            PopulateOptions {
                max_calls: Some(2),
                ..PopulateOptions::default()
            },
        )
        .unwrap();

    assert_eq!(report.made, 2);
    assert_eq!(db.pending_keys("__activity", &ActivityMaker { fail_on: None }).unwrap().len(), 1);
}

#[test]
fn populate_rejects_non_auto_tiers() {
    let mut db = db();
    let err = db
        .populate("session", &ActivityMaker { fail_on: None }, PopulateOptions::default())
        .unwrap_err();

    assert_eq!(err.origin, ErrorOrigin::Populate);
}

///
/// OffKeyMaker
/// makes a row for a different session than it was asked for
///

struct OffKeyMaker;

impl Populate for OffKeyMaker {
    fn key_source(&self, _: &Db) -> Result<Vec<Row>, InternalError> {
        Ok(vec![Row::new().with("session_id", 1)])
    }

    fn make(&self, _: &Row, _: &Db) -> Result<Made, InternalError> {
        Ok(Made::new().row(Row::new().with("session_id", 9).with("score", 0)))
    }
}

#[test]
fn make_outside_key_is_rejected() {
    let mut db = db();
    let err = db
        .populate("__activity", &OffKeyMaker, PopulateOptions::default())
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::InvariantViolation);
    assert_eq!(db.len("__activity").unwrap(), 0);
}

//
// add_table
//

#[test]
fn add_table_declares_and_seeds() {
    let mut db = Db::new(Schema::new("lab").with_table(session()), DbConfig::default()).unwrap();

    let name = db.add_table(species()).unwrap();
    assert_eq!(name, "#species");
    assert_eq!(db.len("#species").unwrap(), 2);

    let err = db.add_table(species()).unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn add_table_leaves_store_untouched_on_invalid_def() {
    let mut db = Db::new(Schema::new("lab").with_table(session()), DbConfig::default()).unwrap();
    let before: Vec<String> = db.table_names().map(ToString::to_string).collect();

    assert!(db.add_table(TableDef::manual("Broken", Heading::new())).is_err());

    let after: Vec<String> = db.table_names().map(ToString::to_string).collect();
    assert_eq!(before, after);
    assert!(db.schema().get("Broken").is_none());
}

#[test]
fn add_table_rolls_back_when_seeding_fails() {
    let mut db = Db::new(Schema::new("lab").with_table(session()), DbConfig::default()).unwrap();
    let before: Vec<String> = db.table_names().map(ToString::to_string).collect();

    let bad = species().with_contents([Row::new().with("species", "cat").with("legs", "four")]);
    let err = db.add_table(bad).unwrap_err();
    assert!(err.message.contains("four"));

    let after: Vec<String> = db.table_names().map(ToString::to_string).collect();
    assert_eq!(before, after);
    assert!(db.schema().get("Species").is_none());

    // a corrected definition is accepted afterwards
    assert_eq!(db.add_table(species()).unwrap(), "#species");
    assert_eq!(db.len("#species").unwrap(), 2);
}

//
// observability
//

#[derive(Default)]
struct CaptureSink {
    events: RefCell<Vec<MetricsEvent>>,
}

impl MetricsSink for CaptureSink {
    fn record(&self, event: MetricsEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[test]
fn seeding_emits_declare_insert_and_seed_events() {
    let sink = Rc::new(CaptureSink::default());

    with_metrics_sink(sink.clone(), || {
        Db::new(Schema::new("lab").with_table(species()), DbConfig::default()).unwrap();
    });

    assert_eq!(
        *sink.events.borrow(),
        vec![
            MetricsEvent::TableDeclared {
                table: "#species".to_string()
            },
            MetricsEvent::Insert {
                table: "#species".to_string(),
                inserted: 2,
                skipped: 0
            },
            MetricsEvent::LookupSeeded {
                table: "#species".to_string(),
                inserted: 2,
                skipped: 0
            },
        ]
    );
}
