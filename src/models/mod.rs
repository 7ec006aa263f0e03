//! Data carried by the recorder: metrics, their aggregates, and the export document.

pub mod export;
pub mod metric;
pub mod stats;

pub use export::MetricsExport;
pub use metric::{Completion, Metadata, Metric, MetricId, MetricKind, MetricStatus};
pub use stats::{MetricStats, OverallStats, Summary};
