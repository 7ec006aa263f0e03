//! Liveness endpoint.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Registers the health check route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub recording: bool,
    pub retained: usize,
    pub capacity: usize,
}

/// Always 200 while the process is serving; reports the recorder's state.
async fn health_check(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        recording: state.recorder.is_enabled(),
        retained: state.recorder.get_metrics().len(),
        capacity: state.recorder.capacity(),
    })
}
