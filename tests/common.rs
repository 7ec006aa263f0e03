#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use perf_recorder::config::{load_config_from_str, ConfigV1};
use perf_recorder::metrics::Recorder;
use perf_recorder::routes::create_router;
use perf_recorder::state::AppState;
use serde_json::Value;

/// Dashboard config with request tracking off so handler output only
/// reflects metrics the test records itself.
pub const QUIET_CONFIG: &str = r#"
version: "1.0.0"
recorder:
  capacity: 50
dashboard:
  track_requests: false
"#;

pub const TRACKING_CONFIG: &str = r#"
version: "1.0.0"
dashboard:
  track_requests: true
"#;

pub fn build_app(yaml: &str) -> (Router, Recorder, Arc<ConfigV1>) {
    let config = Arc::new(load_config_from_str(yaml).expect("test config should parse"));
    let recorder = Recorder::with_config(&config.recorder);
    let state = AppState {
        config: config.clone(),
        recorder: recorder.clone(),
    };
    (create_router(state), recorder, config)
}

pub fn request(method: Method, path: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn json_request(method: Method, path: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body")
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
