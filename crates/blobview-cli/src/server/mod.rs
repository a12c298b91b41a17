//! Listener setup for the viewer.
//!
//! Plain HTTP is served by default. Builds with the `tls` feature terminate
//! TLS with rustls using the certificate pair from [`ServerConfig`].

mod error;
#[cfg(not(feature = "tls"))]
mod http_server;
#[cfg(feature = "tls")]
mod https_server;
mod lifecycle;

use axum::Router;

pub use self::error::{ServerError, ServerResult};
use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;

/// Runs the viewer until a stop signal drains it or the listener fails.
///
/// Every failure is reported once here, with its code and a recovery hint.
///
/// # Errors
///
/// Returns [`ServerError`] when the address cannot be bound, when the TLS
/// pair is missing or unreadable, or when serving aborts.
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        tls = cfg!(feature = "tls"),
        "Starting listener"
    );

    #[cfg(feature = "tls")]
    let outcome = https_server::serve_https(app, config).await;
    #[cfg(not(feature = "tls"))]
    let outcome = http_server::serve_http(app, config).await;

    if let Err(err) = &outcome {
        lifecycle::report_error(err);
    }
    outcome
}
