//! Logging setup: OTel-aligned JSON lines or a pretty console format.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::RecorderError;

/// Collects event fields into a JSON attribute map.
#[derive(Default)]
struct AttributeVisitor {
    attributes: Map<String, Value>,
}

impl Visit for AttributeVisitor {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.attributes.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.attributes.insert(field.name().to_string(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.attributes.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.attributes.insert(field.name().to_string(), value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.attributes.insert(field.name().to_string(), value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.attributes
            .insert(field.name().to_string(), format!("{:?}", value).into());
    }
}

/// Formats each event as one OpenTelemetry log-data-model JSON line.
///
/// Recorder fields (`metric_name`, `metric_kind`, `duration_ms`, ...) end up
/// under `attributes` with a `metric.` prefix.
#[derive(Clone)]
struct OtelJsonFormatter {
    resource: Map<String, Value>,
}

impl OtelJsonFormatter {
    fn new(config: &LoggingConfig) -> Self {
        let mut resource = Map::new();
        resource.insert("service.name".into(), config.service_name.clone().into());
        resource.insert(
            "service.version".into(),
            config.service_version.clone().into(),
        );
        OtelJsonFormatter { resource }
    }

    fn severity_number(level: &Level) -> u64 {
        match *level {
            Level::TRACE => 1,
            Level::DEBUG => 5,
            Level::INFO => 9,
            Level::WARN => 13,
            Level::ERROR => 17,
        }
    }

    fn attribute_key(field: String) -> String {
        match field.strip_prefix("metric_") {
            Some(rest) => format!("metric.{}", rest),
            None => field,
        }
    }
}

impl<S, N> FormatEvent<S, N> for OtelJsonFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut visitor = AttributeVisitor::default();
        event.record(&mut visitor);

        let body = visitor
            .attributes
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| metadata.name().to_string());

        let mut attributes: Map<String, Value> = visitor
            .attributes
            .into_iter()
            .map(|(key, value)| (Self::attribute_key(key), value))
            .collect();
        if let Some(file) = metadata.file() {
            attributes.insert("code.filepath".into(), file.into());
        }
        if let Some(line) = metadata.line() {
            attributes.insert("code.lineno".into(), line.into());
        }
        attributes.insert("code.target".into(), metadata.target().into());

        let mut root = Map::new();
        root.insert(
            "timestamp".into(),
            Utc::now()
                .to_rfc3339_opts(SecondsFormat::Millis, true)
                .into(),
        );
        root.insert("severity_text".into(), metadata.level().as_str().into());
        root.insert(
            "severity_number".into(),
            Self::severity_number(metadata.level()).into(),
        );
        root.insert("body".into(), body.into());
        root.insert("resource".into(), Value::Object(self.resource.clone()));
        root.insert("attributes".into(), Value::Object(attributes));

        let line = serde_json::to_string(&Value::Object(root)).map_err(|_| std::fmt::Error)?;
        writer.write_str(&line)?;
        writer.write_char('\n')
    }
}

/// Parses a `logging.level` value.
pub fn parse_level(level: &str) -> Result<LevelFilter, RecorderError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        "off" => Ok(LevelFilter::OFF),
        other => Err(RecorderError::Logging(format!(
            "invalid logging.level '{}'; valid values: trace, debug, info, warn, error, off",
            other
        ))),
    }
}

/// Installs the global tracing subscriber and bridges `log` records into it.
///
/// `RUST_LOG` directives are honoured on top of the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), RecorderError> {
    let level = parse_level(&config.level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let format_layer: Box<dyn Layer<Registry> + Send + Sync> =
        match config.format.trim().to_lowercase().as_str() {
            "json" => fmt::layer()
                .event_format(OtelJsonFormatter::new(config))
                .boxed(),
            _ => fmt::layer().pretty().boxed(),
        };

    let subscriber = tracing_subscriber::registry()
        .with(format_layer)
        .with(filter);

    tracing_log::LogTracer::init().map_err(|e| RecorderError::Logging(e.to_string()))?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| RecorderError::Logging(e.to_string()))
}
