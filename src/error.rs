//! Crate-level error type.
//!
//! Instrumentation calls never fail; these errors only come from the ambient
//! surfaces around the recorder (configuration, export, logging, serving).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] figment::Error),

    #[error("failed to (de)serialize metrics: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
