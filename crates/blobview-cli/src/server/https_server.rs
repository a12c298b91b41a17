//! HTTPS server startup using rustls.

use std::io;
use std::path::Path;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;

use super::lifecycle::{drain_on_signal, serve_with_shutdown};
use super::{ServerError, ServerResult};
use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;

/// Starts an HTTPS server with graceful shutdown.
///
/// # Errors
///
/// Returns an error if the certificate paths are missing or unreadable, or
/// if the server fails to bind or run.
pub async fn serve_https(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let (Some(cert_path), Some(key_path)) = (
        server_config.tls_cert_path.clone(),
        server_config.tls_key_path.clone(),
    ) else {
        return Err(ServerError::InvalidConfig(
            "Both TLS certificate and key paths must be provided".to_owned(),
        ));
    };

    validate_tls_files(&cert_path, &key_path)?;

    let server_addr = server_config.server_addr();
    let shutdown_timeout = server_config.shutdown_timeout();

    serve_with_shutdown(&server_config, move || async move {
        let tls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Failed to load TLS certificates: {e}"),
                )
            })?;

        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            cert_path = %cert_path.display(),
            key_path = %key_path.display(),
            "TLS certificates loaded successfully"
        );

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            drain_on_signal(shutdown_timeout).await;
            shutdown_handle.graceful_shutdown(Some(shutdown_timeout));
        });

        axum_server::bind_rustls(server_addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
    })
    .await
}

fn validate_tls_files(cert_path: &Path, key_path: &Path) -> ServerResult<()> {
    let validate_file = |path: &Path, file_type: &str| -> ServerResult<()> {
        let metadata = std::fs::metadata(path).map_err(|err| {
            ServerError::TlsCertificate(format!(
                "{file_type} file cannot be read: {}: {err}",
                path.display()
            ))
        })?;

        if !metadata.is_file() {
            return Err(ServerError::TlsCertificate(format!(
                "{file_type} path is not a file: {}",
                path.display()
            )));
        }

        if metadata.len() == 0 {
            return Err(ServerError::TlsCertificate(format!(
                "{file_type} file is empty: {}",
                path.display()
            )));
        }

        Ok(())
    };

    validate_file(cert_path, "Certificate")?;
    validate_file(key_path, "Private key")?;

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        cert_path = %cert_path.display(),
        key_path = %key_path.display(),
        "TLS files validated successfully"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_tls_files_rejects_nonexistent_files() {
        let result = validate_tls_files(
            Path::new("nonexistent_cert.pem"),
            Path::new("nonexistent_key.pem"),
        );

        let Err(ServerError::TlsCertificate(msg)) = result else {
            panic!("expected TlsCertificate error");
        };
        assert!(msg.contains("Certificate file cannot be read"));
    }
}
