//! Dashboard endpoints over the recorder's query API.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{Metric, MetricKind, MetricStats, OverallStats, Summary};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

const DEFAULT_RECENT_COUNT: usize = 20;

/// Creates the metrics dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(list_metrics).delete(clear_metrics))
        .route("/metrics/recent", get(recent_metrics))
        .route("/metrics/stats/:name", get(metric_stats))
        .route("/metrics/overall", get(overall_stats))
        .route("/metrics/summary", get(summary))
        .route("/metrics/export", get(export_metrics))
        .route("/metrics/enabled", put(set_enabled).get(enabled))
}

#[derive(Deserialize, Debug, Default)]
pub struct MetricsFilter {
    #[serde(rename = "type")]
    pub kind: Option<MetricKind>,
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RecentQuery {
    pub count: Option<usize>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct EnabledState {
    pub enabled: bool,
}

/// GET /metrics: full history oldest first, optionally filtered by `type` and `name`.
async fn list_metrics(
    State(state): State<AppState>,
    Query(filter): Query<MetricsFilter>,
) -> Json<Vec<Metric>> {
    let mut metrics = match filter.kind {
        Some(kind) => state.recorder.get_metrics_by_kind(kind),
        None => state.recorder.get_metrics(),
    };
    if let Some(name) = &filter.name {
        metrics.retain(|m| &m.name == name);
    }
    Json(metrics)
}

/// GET /metrics/recent: newest first.
async fn recent_metrics(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<Metric>> {
    let count = query.count.unwrap_or(DEFAULT_RECENT_COUNT);
    Json(state.recorder.get_recent_metrics(count))
}

async fn metric_stats(State(state): State<AppState>, Path(name): Path<String>) -> Json<MetricStats> {
    Json(state.recorder.get_metric_stats(&name))
}

async fn overall_stats(State(state): State<AppState>) -> Json<OverallStats> {
    Json(state.recorder.get_overall_stats())
}

async fn summary(State(state): State<AppState>) -> Json<Summary> {
    Json(state.recorder.get_summary())
}

/// GET /metrics/export: the export document, as produced by `Recorder::export_metrics`.
async fn export_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, HTTPError> {
    let body = state.recorder.export_metrics()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    ))
}

/// DELETE /metrics
async fn clear_metrics(State(state): State<AppState>) -> StatusCode {
    info!("Clearing metrics on dashboard request");
    state.recorder.clear_metrics();
    StatusCode::NO_CONTENT
}

async fn enabled(State(state): State<AppState>) -> Json<EnabledState> {
    Json(EnabledState {
        enabled: state.recorder.is_enabled(),
    })
}

/// PUT /metrics/enabled with `{"enabled": bool}`.
async fn set_enabled(
    State(state): State<AppState>,
    Json(body): Json<EnabledState>,
) -> Json<EnabledState> {
    state.recorder.set_enabled(body.enabled);
    Json(EnabledState {
        enabled: state.recorder.is_enabled(),
    })
}
