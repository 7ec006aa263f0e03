//! HTTP route definitions and handlers.
//!
//! The dashboard exposes the recorder read-only apart from clearing the
//! history and toggling recording.

mod health_routes;
mod metrics;
mod request_tracking;

pub use metrics::EnabledState;

use crate::state::AppState;
use axum::{middleware, Router};

/// Creates the dashboard router with all routes and the request tracking layer.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(metrics::routes())
        .merge(health_routes::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            request_tracking::track_requests,
        ))
        .with_state(state)
}
