//! Observability: runtime counters and the sink every instrumented
//! operation reports through.

pub(crate) mod metrics;
pub(crate) mod sink;

pub use metrics::{EventOps, EventReport, TableCounters};
pub use sink::{
    MetricsEvent, MetricsSink, PopulateOutcome, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
