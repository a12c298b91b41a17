//! Server lifecycle: startup warnings, stop signals and uptime reporting.

use std::future::Future;
use std::io;
use std::time::{Duration, Instant};

use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Serves with lifecycle management and graceful shutdown.
///
/// # Errors
///
/// Returns [`ServerError::Runtime`] when the serve future fails.
pub async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> ServerResult<()>
where
    F: Future<Output = io::Result<()>>,
{
    let start_time = Instant::now();

    log_security_warnings(server_config);
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_config.server_addr(),
        "Server is ready and listening for connections"
    );

    let result = serve_fn().await.map_err(ServerError::Runtime);
    handle_result(result, start_time)
}

/// Logs security warnings for potentially unsafe configurations.
fn log_security_warnings(config: &ServerConfig) {
    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server bound to all interfaces, ensure firewall is configured"
        );
    }
}

/// Handles the server result and logs appropriate messages.
fn handle_result(result: ServerResult<()>, start_time: Instant) -> ServerResult<()> {
    let uptime = start_time.elapsed();

    match result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs = uptime.as_secs(),
                "Shutdown completed"
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs = uptime.as_secs(),
                "Server stopped after a fatal error"
            );
            Err(err)
        }
    }
}

/// Process signals that stop the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// SIGINT, usually Ctrl+C in a terminal.
    Interrupt,
    /// SIGTERM, sent by service managers and container runtimes.
    Terminate,
}

impl StopSignal {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// Resolves with the first stop signal delivered to the process.
///
/// A listener that cannot be installed never resolves and leaves the
/// other one in charge.
pub async fn stop_signal() -> StopSignal {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => StopSignal::Interrupt,
            Err(err) => unavailable(StopSignal::Interrupt, err).await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                StopSignal::Terminate
            }
            Err(err) => unavailable(StopSignal::Terminate, err).await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<StopSignal>();

    tokio::select! {
        signal = interrupt => signal,
        signal = terminate => signal,
    }
}

async fn unavailable(signal: StopSignal, err: io::Error) -> StopSignal {
    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal = signal.as_str(),
        error = %err,
        "Cannot listen for stop signal"
    );
    std::future::pending().await
}

/// Waits for a stop signal, then logs the drain window in-flight requests get.
pub async fn drain_on_signal(grace: Duration) {
    let signal = stop_signal().await;
    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal = signal.as_str(),
        grace_secs = grace.as_secs(),
        "Stop signal received, draining connections"
    );
}

/// Logs a server error with its code and recovery suggestion.
pub fn report_error(err: &ServerError) {
    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        error = %err,
        error_code = err.error_code(),
        recoverable = err.is_recoverable(),
        "Fatal server error"
    );

    if let Some(suggestion) = err.suggestion() {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            suggestion = suggestion,
            "Recovery suggestion"
        );
    }
}
