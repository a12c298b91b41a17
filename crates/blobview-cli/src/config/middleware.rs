//! Middleware configuration for the HTTP server.
//!
//! The recovery settings are re-exported from `blobview-server` and support
//! both CLI arguments and environment variables.
//!
//! # Example
//!
//! ```bash
//! blobview --request-timeout 60
//! ```

use anyhow::{Result as AnyhowResult, anyhow};
use blobview_server::middleware::RecoveryConfig;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Upper bound for the request timeout in seconds.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Middleware configuration.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Recovery middleware configuration.
    ///
    /// Controls request timeout and panic recovery behavior.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Validates the request timeout range (1-300 seconds).
    pub fn validate(&self) -> AnyhowResult<()> {
        let timeout = self.recovery.request_timeout;
        if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT_SECS {
            return Err(anyhow!(
                "Request timeout {timeout} seconds is invalid. Must be between 1 and {MAX_REQUEST_TIMEOUT_SECS} seconds."
            ));
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}
