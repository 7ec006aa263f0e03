use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// HTTP dashboard exposing the recorder's query API.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct DashboardConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Record every dashboard request as a `network` metric.
    #[serde(default = "default_enabled")]
    pub track_requests: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            enabled: true,
            bind_address: default_bind_address(),
            track_requests: true,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1:9464".to_string()
}
