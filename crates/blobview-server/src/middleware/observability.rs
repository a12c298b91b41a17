//! Observability middleware for tracing and request metrics.

use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::http::header;
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use super::RouteCategory;

/// Tracing target for request metrics.
const TRACING_TARGET_METRICS: &str = "blobview_server::middleware::metrics";

/// Header carrying the request id.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Layers request tracing.
    ///
    /// Generates a request id per request, opens a tracing span for it,
    /// echoes the id in the response and redacts the cookie header, which
    /// carries the session id.
    fn with_observability(self) -> Self;

    /// Layers per-request metrics: route category, status, duration and
    /// body sizes, logged at trace level.
    fn with_metrics(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(PropagateRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
        ))
        .layer(SetSensitiveRequestHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
    }

    fn with_metrics(self) -> Self {
        self.layer(from_fn(track_categorized_metrics))
    }
}

/// Request metrics middleware with categorization and timing.
async fn track_categorized_metrics(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let category = RouteCategory::from_uri(request.uri());
    let request_size = content_length(request.headers());

    tracing::trace!(
        target: TRACING_TARGET_METRICS,
        method = %method,
        category = category.as_str(),
        request_size,
        "request started"
    );

    let response = next.run(request).await;
    let duration = start_time.elapsed();

    tracing::trace!(
        target: TRACING_TARGET_METRICS,
        method = %method,
        category = category.as_str(),
        status = %response.status(),
        duration_ms = duration.as_millis() as u64,
        request_size,
        response_size = content_length(response.headers()),
        "request completed"
    );

    response
}

fn content_length(headers: &header::HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0)
}
