use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Open-ended key/value attachment supplied when a metric starts.
pub type Metadata = Map<String, Value>;

/// Identifier of a recorded metric.
///
/// The empty id is what a disabled recorder hands out; every operation that
/// receives it does nothing.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MetricId(String);

impl MetricId {
    /// Generates a fresh, globally unique id.
    pub fn generate() -> Self {
        MetricId(Uuid::new_v4().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MetricId {
    fn from(value: &str) -> Self {
        MetricId(value.to_string())
    }
}

impl From<String> for MetricId {
    fn from(value: String) -> Self {
        MetricId(value)
    }
}

/// Category of the measured operation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Api,
    Database,
    Network,
    Custom,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Api => "api",
            MetricKind::Database => "database",
            MetricKind::Network => "network",
            MetricKind::Custom => "custom",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    #[default]
    Pending,
    Success,
    Error,
}

impl MetricStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MetricStatus::Pending)
    }
}

/// Terminal outcome passed to `Recorder::end_metric`.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Success { response_size: Option<u64> },
    Error { message: String },
}

impl Completion {
    pub fn success() -> Self {
        Completion::Success {
            response_size: None,
        }
    }

    pub fn success_with_size(response_size: u64) -> Self {
        Completion::Success {
            response_size: Some(response_size),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Completion::Error {
            message: message.into(),
        }
    }

    pub fn status(&self) -> MetricStatus {
        match self {
            Completion::Success { .. } => MetricStatus::Success,
            Completion::Error { .. } => MetricStatus::Error,
        }
    }
}

/// One observation of a timed operation.
///
/// Times are milliseconds on the owning recorder's monotonic clock.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: MetricId,
    pub name: String,
    pub kind: MetricKind,
    pub start_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub status: MetricStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Metric {
    /// Builds a pending metric. `url` and `method` are lifted out of the
    /// metadata when present as strings; the metadata itself is kept as given.
    pub fn pending(
        id: MetricId,
        name: String,
        kind: MetricKind,
        start_time: f64,
        metadata: Option<Metadata>,
    ) -> Self {
        let lookup = |key: &str| {
            metadata
                .as_ref()
                .and_then(|m| m.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let url = lookup("url");
        let method = lookup("method");

        Metric {
            id,
            name,
            kind,
            start_time,
            end_time: None,
            duration: None,
            status: MetricStatus::Pending,
            error: None,
            url,
            method,
            response_size: None,
            metadata,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_terminal()
    }

    /// Moves a pending metric into its terminal state.
    ///
    /// Returns `false` and leaves the metric untouched when it has already
    /// completed.
    pub fn complete(&mut self, end_time: f64, completion: Completion) -> bool {
        if self.is_complete() {
            return false;
        }

        let end_time = end_time.max(self.start_time);
        self.end_time = Some(end_time);
        self.duration = Some(end_time - self.start_time);
        self.status = completion.status();
        match completion {
            Completion::Success { response_size } => self.response_size = response_size,
            Completion::Error { message } => self.error = Some(message),
        }
        true
    }
}
