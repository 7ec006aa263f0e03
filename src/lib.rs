//! In-process performance telemetry: a bounded metric history with
//! listeners, statistics, JSON export and an optional HTTP dashboard.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod startup;
pub mod state;
pub mod utils;

pub use error::RecorderError;
pub use metrics::{MetricListener, MetricTimer, Recorder, Subscription};
pub use models::{
    Completion, Metadata, Metric, MetricId, MetricKind, MetricStats, MetricStatus, MetricsExport,
    OverallStats, Summary,
};
