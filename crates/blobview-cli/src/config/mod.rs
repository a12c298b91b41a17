//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig         # Host, port, TLS, shutdown
//! ├── middleware: MiddlewareConfig # Request timeout
//! └── service: ServiceConfig       # Default container, credentials, paging, caching
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Point the viewer at a public container
//! blobview --azure-account-url "https://acct.blob.core.windows.net" --azure-container photos
//!
//! # Or via environment variables
//! AZURE_CONNECTION_STRING="..." AZURE_CONTAINER=photos PORT=8080 blobview
//! ```

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use blobview_server::service::ServiceConfig;
use clap::Parser;
pub use middleware::MiddlewareConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
///
/// Combines all configuration groups for the viewer:
/// - [`ServerConfig`]: Network binding and TLS
/// - [`MiddlewareConfig`]: HTTP middleware (recovery)
/// - [`ServiceConfig`]: Session defaults and storage access
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "blobview")]
#[command(about = "Paginated image viewer for Azure Blob Storage containers")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Viewer defaults and storage access configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so that its
    /// values act as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        self.validate_timeouts()
    }

    /// Requires the request timeout to outlast the slowest render pass, so
    /// a slow page is answered with per-item failures instead of a 408.
    fn validate_timeouts(&self) -> anyhow::Result<()> {
        let request = self.middleware.recovery.request_timeout();
        let render = self.service.render_pass_limit();
        if request <= render {
            anyhow::bail!(
                "Request timeout ({}s) must exceed storage timeout plus image load timeout ({}s)",
                request.as_secs(),
                render.as_secs()
            );
        }
        Ok(())
    }

    /// Logs configuration at info level (no sensitive information).
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            "Starting blobview server"
        );

        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            container = self.service.azure_container.as_deref().unwrap_or_default(),
            account_url = self.service.azure_account_url.as_deref().unwrap_or_default(),
            has_sas_token = self.service.azure_sas_token.is_some(),
            has_connection_string = self.service.azure_connection_string.is_some(),
            default_page_size = self.service.default_page_size,
            storage_timeout_secs = self.service.storage_timeout,
            image_load_timeout_secs = self.service.image_load_timeout,
            session_ttl_secs = self.service.session_ttl,
            content_cache_bytes = self.service.content_cache_bytes,
            "Viewer configuration"
        );

        if !self.service.has_default_container() {
            tracing::warn!(
                target: TRACING_TARGET_CONFIG,
                "No default container configured, users must enter one in the viewer"
            );
        }
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "tls").then_some("tls"),
            cfg!(feature = "dotenv").then_some("dotenv"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    #[cfg(not(feature = "tls"))]
    fn parses_defaults_and_overrides() {
        let cli = Cli::try_parse_from([
            "blobview",
            "--port",
            "8080",
            "--azure-container",
            "photos",
            "--default-page-size",
            "24",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.server.port, 8080);
        assert_eq!(cli.service.azure_container.as_deref(), Some("photos"));
        assert_eq!(cli.service.default_page_size, 24);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn default_timeouts_are_ordered() {
        let cli = Cli::try_parse_from(["blobview"]).expect("arguments should parse");
        assert!(cli.validate_timeouts().is_ok());
    }

    #[test]
    fn request_timeout_must_outlast_render_pass() {
        let cli = Cli::try_parse_from([
            "blobview",
            "--storage-timeout",
            "30",
            "--image-load-timeout",
            "30",
            "--request-timeout",
            "60",
        ])
        .expect("arguments should parse");

        let err = cli.validate_timeouts().unwrap_err();
        assert!(err.to_string().contains("must exceed"));

        let cli = Cli::try_parse_from([
            "blobview",
            "--storage-timeout",
            "30",
            "--image-load-timeout",
            "30",
            "--request-timeout",
            "61",
        ])
        .expect("arguments should parse");
        assert!(cli.validate_timeouts().is_ok());
    }

    #[test]
    fn rejects_invalid_page_size() {
        let cli = Cli::try_parse_from(["blobview", "--default-page-size", "1"])
            .expect("arguments should parse");
        assert!(cli.validate().is_err());
    }
}
