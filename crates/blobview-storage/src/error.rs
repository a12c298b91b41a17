//! Storage error types.

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No usable authentication mode could be resolved from the configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The storage handle could not be constructed from the resolved
    /// configuration (malformed endpoint, invalid account key).
    #[error("connection failed: {0}")]
    Connection(String),

    /// Blob or container not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The storage service answered with an unexpected status.
    #[error("storage service returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Service error code or a short excerpt of the response body.
        message: String,
    },

    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The in-memory store was told to fail.
    #[error("injected failure: {0}")]
    Injected(String),
}

impl StorageError {
    /// Creates a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a new not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Creates a new permission denied error.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Creates a new invalid response error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Creates a new injected failure, used by test doubles.
    pub fn injected(msg: impl Into<String>) -> Self {
        Self::Injected(msg.into())
    }

    /// Returns whether this error was raised before any network call because
    /// the configuration is incomplete.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns whether the requested blob or container does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns whether the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(StorageError::config("missing").is_config());
        assert!(!StorageError::connection("bad url").is_config());
        assert!(StorageError::not_found("a.png").is_not_found());
        assert!(!StorageError::injected("boom").is_timeout());
    }

    #[test]
    fn display_includes_status() {
        let err = StorageError::Http {
            status: 503,
            message: "ServerBusy".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "storage service returned HTTP 503: ServerBusy"
        );
    }
}
