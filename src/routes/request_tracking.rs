//! Records dashboard requests as network metrics.

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;

use crate::models::{Metadata, MetricKind};
use crate::state::AppState;

/// Times each routed request when `dashboard.track_requests` is on.
///
/// The metric is named after the matched route template so that
/// `/metrics/stats/a` and `/metrics/stats/b` aggregate together. Responses
/// with a 4xx or 5xx status complete as errors.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.dashboard.track_requests {
        return next.run(request).await;
    }

    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().to_string();

    let mut metadata = Metadata::new();
    metadata.insert("url".to_string(), Value::from(request.uri().to_string()));
    metadata.insert("method".to_string(), Value::from(method.clone()));

    let timer = state.recorder.start_timer(
        format!("{} {}", method, route),
        MetricKind::Network,
        Some(metadata),
    );
    let response = next.run(request).await;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        timer.fail(format!("HTTP {}", status));
    } else {
        timer.succeed();
    }
    response
}
