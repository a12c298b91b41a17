//! Storage configuration types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifies a container and the credentials used to reach it.
///
/// Empty strings are treated the same as absent values. Exactly one
/// authentication mode is picked from the populated fields, see
/// [`ResolvedAccess::resolve`](crate::ResolvedAccess::resolve).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Container name.
    pub container: String,
    /// Storage account URL, e.g. `https://<account>.blob.core.windows.net`.
    #[serde(default)]
    pub account_url: Option<String>,
    /// Shared access signature, with or without a leading `?`.
    #[serde(default, skip_serializing)]
    pub sas_token: Option<String>,
    /// Full storage connection string.
    #[serde(default, skip_serializing)]
    pub connection_string: Option<String>,
}

impl ContainerConfig {
    /// Creates a configuration for the given container without credentials.
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            ..Self::default()
        }
    }

    /// Sets the account URL.
    pub fn with_account_url(mut self, account_url: impl Into<String>) -> Self {
        self.account_url = Some(account_url.into());
        self
    }

    /// Sets the SAS token.
    pub fn with_sas_token(mut self, sas_token: impl Into<String>) -> Self {
        self.sas_token = Some(sas_token.into());
        self
    }

    /// Sets the connection string.
    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = Some(connection_string.into());
        self
    }

    /// Returns the account URL, if set and non-empty.
    pub fn account_url(&self) -> Option<&str> {
        non_empty(self.account_url.as_deref())
    }

    /// Returns the SAS token, if set and non-empty.
    pub fn sas_token(&self) -> Option<&str> {
        non_empty(self.sas_token.as_deref())
    }

    /// Returns the connection string, if set and non-empty.
    pub fn connection_string(&self) -> Option<&str> {
        non_empty(self.connection_string.as_deref())
    }
}

impl fmt::Debug for ContainerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerConfig")
            .field("container", &self.container)
            .field("account_url", &self.account_url)
            .field("has_sas_token", &self.sas_token().is_some())
            .field("has_connection_string", &self.connection_string().is_some())
            .finish()
    }
}

/// Settings for the HTTP client shared by every Azure container handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct StorageClientConfig {
    /// Maximum time for a single storage request, including the body.
    pub request_timeout: Duration,
    /// Maximum time to establish a connection.
    pub connect_timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl StorageClientConfig {
    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for StorageClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("blobview/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_absent() {
        let config = ContainerConfig::new("photos")
            .with_account_url("")
            .with_sas_token("")
            .with_connection_string("");

        assert_eq!(config.account_url(), None);
        assert_eq!(config.sas_token(), None);
        assert_eq!(config.connection_string(), None);
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = ContainerConfig::new("photos")
            .with_sas_token("sv=2024&sig=abc")
            .with_connection_string("AccountKey=c2VjcmV0");
        let debug = format!("{config:?}");

        assert!(!debug.contains("sig=abc"));
        assert!(!debug.contains("c2VjcmV0"));
        assert!(debug.contains("has_sas_token: true"));
    }
}
