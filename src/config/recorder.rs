use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY: usize = 1000;

/// Settings for a `Recorder` instance.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct RecorderConfig {
    /// Initial value of the enabled flag.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of metrics retained; values below 1 are raised to 1.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Whether tracked calls compute `responseSize` by serializing their result.
    #[serde(default = "default_true")]
    pub measure_response_size: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        RecorderConfig {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
            measure_response_size: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
