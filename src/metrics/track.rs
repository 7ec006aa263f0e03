//! Async wrappers that time a unit of work without altering its outcome.

use std::fmt::Display;
use std::future::Future;
use std::io;

use serde::Serialize;
use serde_json::Value;

use super::recorder::Recorder;
use crate::models::{Completion, Metadata, MetricKind};

/// `io::Write` sink that only counts bytes.
#[derive(Default)]
struct ByteCounter(u64);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Byte length of `value` serialized as JSON, or `None` if it cannot be serialized.
pub fn serialized_size<T: Serialize + ?Sized>(value: &T) -> Option<u64> {
    let mut counter = ByteCounter::default();
    serde_json::to_writer(&mut counter, value).ok()?;
    Some(counter.0)
}

fn api_metadata(url: &str, method: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("url".to_string(), Value::from(url));
    metadata.insert("method".to_string(), Value::from(method));
    metadata
}

impl Recorder {
    /// Times an API call, recording `url` and `method` alongside it.
    ///
    /// The result of `operation` is returned untouched, success or failure.
    pub async fn track_api_call<F, T, E>(
        &self,
        name: &str,
        url: &str,
        method: &str,
        operation: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        T: Serialize,
        E: Display,
    {
        self.track_operation(name, MetricKind::Api, Some(api_metadata(url, method)), operation)
            .await
    }

    /// `track_api_call` for results that are not `Serialize`.
    ///
    /// Pass `|_| None` to leave `responseSize` unset.
    pub async fn track_api_call_with_sizer<F, T, E, S>(
        &self,
        name: &str,
        url: &str,
        method: &str,
        operation: F,
        sizer: S,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
        S: FnOnce(&T) -> Option<u64>,
    {
        let metadata = Some(api_metadata(url, method));
        self.track_with_sizer(name, MetricKind::Api, metadata, operation, sizer)
            .await
    }

    /// Times a database query. For results that are not `Serialize`, use
    /// `track_with_sizer` with `MetricKind::Database`.
    pub async fn track_database_query<F, T, E>(&self, name: &str, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        T: Serialize,
        E: Display,
    {
        self.track_operation(name, MetricKind::Database, None, operation)
            .await
    }

    /// Times `operation` under any kind, sizing successful results by their
    /// JSON encoding when response sizing is enabled.
    pub async fn track_operation<F, T, E>(
        &self,
        name: &str,
        kind: MetricKind,
        metadata: Option<Metadata>,
        operation: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        T: Serialize,
        E: Display,
    {
        let measure = self.measures_response_size();
        self.track_with_sizer(name, kind, metadata, operation, |value: &T| {
            if measure {
                serialized_size(value)
            } else {
                None
            }
        })
        .await
    }

    /// Times `operation`, computing `responseSize` with `sizer`.
    ///
    /// Use this for results that are not `Serialize`, or to size them more
    /// cheaply. While disabled the operation is awaited directly.
    pub async fn track_with_sizer<F, T, E, S>(
        &self,
        name: &str,
        kind: MetricKind,
        metadata: Option<Metadata>,
        operation: F,
        sizer: S,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
        S: FnOnce(&T) -> Option<u64>,
    {
        if !self.is_enabled() {
            return operation.await;
        }

        // If this future is dropped mid-await the timer records the cancellation.
        let timer = self.start_timer(name, kind, metadata);
        let outcome = operation.await;
        match &outcome {
            Ok(value) => timer.finish(Completion::Success {
                response_size: sizer(value),
            }),
            Err(err) => timer.finish(Completion::error(err.to_string())),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecorderConfig;
    use crate::metrics::timer::CANCELLED_MESSAGE;
    use crate::models::{Metric, MetricStatus};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    struct ApiError {
        code: u16,
    }

    impl Display for ApiError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "request failed with status {}", self.code)
        }
    }

    #[test]
    fn serialized_size_counts_json_bytes() {
        assert_eq!(serialized_size(&json!({"a": 1})), Some(7));
        assert_eq!(serialized_size("abc"), Some(5));
    }

    #[tokio::test]
    async fn successful_call_is_recorded_and_returned_unchanged() {
        let recorder = Recorder::new();
        let result: Result<Vec<&str>, ApiError> = recorder
            .track_api_call("Get Users", "/api/users", "GET", async {
                Ok(vec!["ana", "ben"])
            })
            .await;

        assert_eq!(result, Ok(vec!["ana", "ben"]));
        let metric = &recorder.get_metrics()[0];
        assert_eq!(metric.kind, MetricKind::Api);
        assert_eq!(metric.status, MetricStatus::Success);
        assert_eq!(metric.url.as_deref(), Some("/api/users"));
        assert_eq!(metric.method.as_deref(), Some("GET"));
        assert_eq!(metric.response_size, Some(13));
        assert_eq!(
            metric.metadata.as_ref().unwrap()["url"],
            json!("/api/users")
        );
    }

    #[tokio::test]
    async fn failed_call_is_recorded_and_error_propagated() {
        let recorder = Recorder::new();
        let result: Result<u32, ApiError> = recorder
            .track_database_query("Load Projects", async { Err(ApiError { code: 503 }) })
            .await;

        assert_eq!(result, Err(ApiError { code: 503 }));
        let metric = &recorder.get_metrics()[0];
        assert_eq!(metric.kind, MetricKind::Database);
        assert_eq!(metric.status, MetricStatus::Error);
        assert_eq!(
            metric.error.as_deref(),
            Some("request failed with status 503")
        );
        assert!(metric.response_size.is_none());
    }

    #[tokio::test]
    async fn multi_line_error_text_is_stored_as_reported() {
        struct Chained(&'static str);

        impl Display for Chained {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.0)
            }
        }

        let recorder = Recorder::new();
        let result: Result<(), Chained> = recorder
            .track_api_call("Resolve Host", "/resolve", "GET", async {
                Err(Chained("connection refused\ncaused by: dns"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(
            recorder.get_metrics()[0].error.as_deref(),
            Some("connection refused\ncaused by: dns")
        );
    }

    #[tokio::test]
    async fn api_call_with_non_serializable_result_can_skip_sizing() {
        struct Connection {
            port: u16,
        }

        let recorder = Recorder::new();
        let conn: Result<Connection, ApiError> = recorder
            .track_api_call_with_sizer(
                "Open Socket",
                "tcp://db:5432",
                "CONNECT",
                async { Ok(Connection { port: 5432 }) },
                |_| None,
            )
            .await;

        assert_eq!(conn.map(|c| c.port).ok(), Some(5432));
        let metric = &recorder.get_metrics()[0];
        assert_eq!(metric.kind, MetricKind::Api);
        assert_eq!(metric.status, MetricStatus::Success);
        assert_eq!(metric.url.as_deref(), Some("tcp://db:5432"));
        assert_eq!(metric.method.as_deref(), Some("CONNECT"));
        assert!(metric.response_size.is_none());
    }

    #[tokio::test]
    async fn disabled_recorder_runs_the_operation_directly() {
        let recorder = Recorder::new();
        recorder.set_enabled(false);

        let ok: Result<u8, ApiError> = recorder
            .track_api_call("X", "/x", "GET", async { Ok(7) })
            .await;
        let err: Result<u8, ApiError> = recorder
            .track_api_call("X", "/x", "GET", async { Err(ApiError { code: 500 }) })
            .await;

        assert_eq!(ok, Ok(7));
        assert_eq!(err, Err(ApiError { code: 500 }));
        recorder.set_enabled(true);
        assert!(recorder.get_metrics().is_empty());
    }

    #[tokio::test]
    async fn response_sizing_can_be_turned_off() {
        let recorder = Recorder::with_config(&RecorderConfig {
            measure_response_size: false,
            ..RecorderConfig::default()
        });
        let _: Result<&str, ApiError> = recorder
            .track_api_call("X", "/x", "GET", async { Ok("payload") })
            .await;

        let metric = &recorder.get_metrics()[0];
        assert_eq!(metric.status, MetricStatus::Success);
        assert!(metric.response_size.is_none());
    }

    #[tokio::test]
    async fn custom_sizer_handles_non_serializable_results() {
        struct Frame(Vec<u8>);

        let recorder = Recorder::new();
        let frame: Result<Frame, ApiError> = recorder
            .track_with_sizer(
                "Decode Thumbnail",
                MetricKind::Custom,
                None,
                async { Ok(Frame(vec![0; 4096])) },
                |frame: &Frame| Some(frame.0.len() as u64),
            )
            .await;

        assert_eq!(frame.map(|f| f.0.len()).ok(), Some(4096));
        assert_eq!(recorder.get_metrics()[0].response_size, Some(4096));
    }

    #[tokio::test]
    async fn timed_out_operation_is_recorded_as_error() {
        let recorder = Recorder::new();
        let slow = recorder.track_api_call("Slow", "/slow", "GET", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ApiError>(())
        });

        let outcome = tokio::time::timeout(Duration::from_millis(10), slow).await;
        assert!(outcome.is_err());

        let metric = &recorder.get_metrics()[0];
        assert_eq!(metric.status, MetricStatus::Error);
        assert_eq!(metric.error.as_deref(), Some(CANCELLED_MESSAGE));
    }

    #[tokio::test]
    async fn listeners_are_notified_from_tracked_calls() {
        let recorder = Recorder::new();
        let seen: Arc<Mutex<Vec<Metric>>> = Arc::default();
        let sink = seen.clone();
        let _sub = recorder.add_listener(move |metric: &Metric| sink.lock().unwrap().push(metric.clone()));

        let _: Result<(), ApiError> = recorder
            .track_database_query("Save Draft", async { Ok(()) })
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name, "Save Draft");
        assert!(seen[0].duration.is_some());
    }
}
