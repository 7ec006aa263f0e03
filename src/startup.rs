//! Dashboard server startup.
//!
//! Builds the recorder from configuration and serves the HTTP dashboard
//! over it until the process receives Ctrl-C.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ConfigV1;
use crate::error::RecorderError;
use crate::metrics::Recorder;
use crate::routes;
use crate::state::AppState;

/// Creates a recorder from `config.recorder` and serves the dashboard over it.
///
/// Returns immediately when the dashboard is disabled.
///
/// # Errors
///
/// Returns an error if the listener cannot bind to `dashboard.bind_address`
/// or the server fails while running.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), RecorderError> {
    let recorder = Recorder::with_config(&config.recorder);
    serve(config, recorder).await
}

/// Serves the dashboard over an existing recorder.
///
/// Lets a host application expose the same recorder its own code writes to.
pub async fn serve(config: Arc<ConfigV1>, recorder: Recorder) -> Result<(), RecorderError> {
    if !config.dashboard.enabled {
        info!("Dashboard disabled, not starting HTTP server");
        return Ok(());
    }

    let listener = TcpListener::bind(&config.dashboard.bind_address).await?;
    info!(
        "Serving metrics dashboard on {} (capacity {})",
        listener.local_addr()?,
        recorder.capacity()
    );

    let state = AppState {
        config: config.clone(),
        recorder,
    };
    let app = routes::create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
