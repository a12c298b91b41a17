//! HTTP server startup.

use std::future::IntoFuture;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::lifecycle::{drain_on_signal, serve_with_shutdown};
use super::{ServerError, ServerResult};
use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;

/// Starts an HTTP server with graceful shutdown.
///
/// In-flight requests get the configured shutdown timeout to finish once
/// a signal arrives; the server then stops regardless.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();
    let shutdown_timeout = server_config.shutdown_timeout();

    let listener = TcpListener::bind(server_addr)
        .await
        .map_err(|err| ServerError::bind_error(server_addr, err))?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Successfully bound to address"
    );

    let signalled = Arc::new(Notify::new());
    let notify = Arc::clone(&signalled);
    let graceful = async move {
        drain_on_signal(shutdown_timeout).await;
        notify.notify_one();
    };

    serve_with_shutdown(&server_config, || async move {
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .into_future();

        tokio::select! {
            result = server => result,
            () = async {
                signalled.notified().await;
                tokio::time::sleep(shutdown_timeout).await;
            } => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER_STARTUP,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Shutdown timeout elapsed, dropping remaining connections"
                );
                Ok(())
            }
        }
    })
    .await
}
