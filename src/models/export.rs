use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::metric::Metric;
use super::stats::OverallStats;
use crate::error::RecorderError;

/// Document produced by `Recorder::export_metrics`.
///
/// Shape: `{timestamp: <ISO-8601>, metrics: [Metric], stats: OverallStats}`,
/// with metrics oldest first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetricsExport {
    pub timestamp: String,
    pub metrics: Vec<Metric>,
    pub stats: OverallStats,
}

impl MetricsExport {
    /// Stamps the export with the current UTC time.
    pub fn new(metrics: Vec<Metric>, stats: OverallStats) -> Self {
        MetricsExport {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            metrics,
            stats,
        }
    }

    pub fn to_json(&self) -> Result<String, RecorderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a document previously produced by `to_json`.
    pub fn from_json(raw: &str) -> Result<Self, RecorderError> {
        Ok(serde_json::from_str(raw)?)
    }
}
