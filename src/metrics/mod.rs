//! In-process metrics: counter/histogram/gauge instruments, the fixed
//! application registry, and its Prometheus/JSON exporters.
//!
//! All operations are synchronous in-memory updates guarded by short
//! per-instrument locks; nothing here suspends or performs I/O, so the
//! registry is safe to share across any concurrency context.

mod counter;
mod export;
mod gauge;
mod histogram;
mod labels;
mod registry;
mod tracker;

pub use counter::Counter;
pub use export::{MetricExport, MetricsReport, MetricsSection, SeriesExport};
pub use gauge::Gauge;
pub use histogram::{DEFAULT_BUCKETS, Histogram, HistogramSnapshot, HistogramSummary};
pub use labels::LabelSet;
pub use registry::MetricsRegistry;
pub use tracker::RequestTracker;
