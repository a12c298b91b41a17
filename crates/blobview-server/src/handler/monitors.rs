//! Health check handler.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::response::MonitorStatus;
use crate::service::{ContentCache, ServiceState, SessionStore};

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "blobview_server::handler::monitors";

#[tracing::instrument(skip_all)]
async fn health_status(
    State(session_store): State<SessionStore>,
    State(content_cache): State<ContentCache>,
) -> Json<MonitorStatus> {
    let response = MonitorStatus::healthy(session_store.len().await, content_cache.len().await);

    tracing::debug!(
        target: TRACING_TARGET,
        active_sessions = response.active_sessions,
        cached_items = response.cached_items,
        "Health status response prepared"
    );

    Json(response)
}

/// Returns a [`Router`] with all health monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}
