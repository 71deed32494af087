//! Metrics sink boundary.
//!
//! Store logic never touches `obs::metrics` directly; all instrumentation
//! flows through `MetricsEvent` and `MetricsSink`.

use crate::obs::metrics::{self, EventReport};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// PopulateOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PopulateOutcome {
    Made,
    Skipped,
    Failed,
}

///
/// MetricsEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    TableDeclared {
        table: String,
    },
    Insert {
        table: String,
        inserted: u64,
        skipped: u64,
    },
    LookupSeeded {
        table: String,
        inserted: u64,
        skipped: u64,
    },
    PopulateKey {
        table: String,
        outcome: PopulateOutcome,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local counter state.
pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::TableDeclared { table } => metrics::with_state_mut(|m| {
                m.ops.tables_declared = m.ops.tables_declared.saturating_add(1);
                m.tables.entry(table).or_default();
            }),
            MetricsEvent::Insert {
                table,
                inserted,
                skipped,
            } => metrics::with_state_mut(|m| {
                m.ops.insert_calls = m.ops.insert_calls.saturating_add(1);
                m.ops.rows_inserted = m.ops.rows_inserted.saturating_add(inserted);
                m.ops.rows_skipped = m.ops.rows_skipped.saturating_add(skipped);

                let entry = m.tables.entry(table).or_default();
                entry.insert_calls = entry.insert_calls.saturating_add(1);
                entry.rows_inserted = entry.rows_inserted.saturating_add(inserted);
                entry.rows_skipped = entry.rows_skipped.saturating_add(skipped);
            }),
            // row counts are already carried by the Insert event seeding emits
            MetricsEvent::LookupSeeded { .. } => metrics::with_state_mut(|m| {
                m.ops.lookup_seeds = m.ops.lookup_seeds.saturating_add(1);
            }),
            MetricsEvent::PopulateKey { table, outcome } => metrics::with_state_mut(|m| {
                let entry = m.tables.entry(table).or_default();
                match outcome {
                    PopulateOutcome::Made => {
                        m.ops.populate_made = m.ops.populate_made.saturating_add(1);
                        entry.populate_made = entry.populate_made.saturating_add(1);
                    }
                    PopulateOutcome::Skipped => {
                        m.ops.populate_skipped = m.ops.populate_skipped.saturating_add(1);
                        entry.populate_skipped = entry.populate_skipped.saturating_add(1);
                    }
                    PopulateOutcome::Failed => {
                        m.ops.populate_failed = m.ops.populate_failed.saturating_add(1);
                        entry.populate_failed = entry.populate_failed.saturating_add(1);
                    }
                }
            }),
        }
    }
}

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

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
    fn override_captures_and_restores() {
        metrics_reset_all();
        let sink = Rc::new(CaptureSink::default());

        with_metrics_sink(sink.clone(), || {
            record(MetricsEvent::TableDeclared {
                table: "#species".to_string(),
            });
        });
        record(MetricsEvent::TableDeclared {
            table: "subject".to_string(),
        });

        assert_eq!(sink.events.borrow().len(), 1);
        let report = metrics_report();
        assert_eq!(report.ops.tables_declared, 1);
        assert!(report.tables.contains_key("subject"));
        assert!(!report.tables.contains_key("#species"));
    }

    #[test]
    fn global_sink_accumulates_per_table() {
        metrics_reset_all();

        for outcome in [PopulateOutcome::Made, PopulateOutcome::Made, PopulateOutcome::Skipped] {
            record(MetricsEvent::PopulateKey {
                table: "__stats".to_string(),
                outcome,
            });
        }
        record(MetricsEvent::Insert {
            table: "__stats".to_string(),
            inserted: 3,
            skipped: 1,
        });

        let report = metrics_report();
        let table = &report.tables["__stats"];
        assert_eq!(table.populate_made, 2);
        assert_eq!(table.populate_skipped, 1);
        assert_eq!(table.rows_inserted, 3);
        assert_eq!(report.ops.rows_skipped, 1);
    }

    #[test]
    fn report_serializes_for_export() {
        metrics_reset_all();
        record(MetricsEvent::LookupSeeded {
            table: "#species".to_string(),
            inserted: 2,
            skipped: 0,
        });

        let json = serde_json::to_value(metrics_report()).unwrap();

        assert_eq!(json["ops"]["lookup_seeds"], 1);
    }
}
