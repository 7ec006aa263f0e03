use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::dashboard::DashboardConfig;
use super::logging::LoggingConfig;
use super::recorder::RecorderConfig;
use crate::error::RecorderError;

pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "PERF_RECORDER_CONFIG";
/// Prefix for environment overrides; `__` separates nested keys
/// (e.g. `PERF_RECORDER_RECORDER__CAPACITY=500`).
pub const ENV_PREFIX: &str = "PERF_RECORDER_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0. Every section falls back to its defaults.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Base layer so a missing file still yields a v1 config.
fn defaults() -> Figment {
    Figment::from(Serialized::default("version", "1.0.0"))
}

/// Load config from the YAML file (see `CONFIG_PATH_ENV`) merged with
/// `PERF_RECORDER_*` environment variables.
pub fn load_config() -> Result<ConfigV1, RecorderError> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let figment = defaults()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    extract(figment)
}

/// Load config from an in-memory YAML document; used by tests and embedders.
pub fn load_config_from_str(yaml: &str) -> Result<ConfigV1, RecorderError> {
    extract(defaults().merge(Yaml::string(yaml)))
}

fn extract(figment: Figment) -> Result<ConfigV1, RecorderError> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// The JSON schema for the configuration, pretty-printed.
pub fn config_schema() -> Result<String, RecorderError> {
    let schema = schema_for!(Config);
    Ok(serde_json::to_string_pretty(&schema)?)
}
