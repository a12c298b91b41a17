//! Storage error to HTTP error conversion implementation.

use blobview_storage::StorageError;

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for storage error conversions.
const TRACING_TARGET: &str = "blobview_server::handler::storage";

impl From<StorageError> for HttpError {
    fn from(error: StorageError) -> Self {
        match &error {
            StorageError::NotFound(_) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Blob not found"
                );
            }
            StorageError::Config(_) | StorageError::Connection(_) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Invalid storage settings"
                );
            }
            _ => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    timeout = error.is_timeout(),
                    "Storage request failed"
                );
            }
        }

        let context = error.to_string();
        match error {
            StorageError::NotFound(_) => ErrorKind::NotFound
                .with_message("Blob not found")
                .with_context(context),

            StorageError::Config(_) | StorageError::Connection(_) => ErrorKind::BadRequest
                .with_message("Invalid storage settings")
                .with_context(context),

            error if error.is_timeout() => ErrorKind::GatewayTimeout
                .with_message("Storage request timed out")
                .with_context(context),

            _ => ErrorKind::BadGateway
                .with_message("Storage request failed")
                .with_context(context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_status() {
        let cases = [
            (StorageError::not_found("cat.png"), ErrorKind::NotFound),
            (
                StorageError::config("no valid authentication method provided"),
                ErrorKind::BadRequest,
            ),
            (
                StorageError::permission_denied("AuthorizationFailure"),
                ErrorKind::BadGateway,
            ),
            (
                StorageError::Http {
                    status: 500,
                    message: "InternalError".to_owned(),
                },
                ErrorKind::BadGateway,
            ),
        ];

        for (error, kind) in cases {
            assert_eq!(HttpError::from(error).kind(), kind);
        }
    }
}
