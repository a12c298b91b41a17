//! Connecting a container configuration to a blob store.

use std::sync::Arc;

use crate::auth::ResolvedAccess;
use crate::azure::AzureContainer;
use crate::config::{ContainerConfig, StorageClientConfig};
use crate::error::{StorageError, StorageResult};
use crate::store::BlobStore;
use crate::TRACING_TARGET;

/// Turns a [`ContainerConfig`] into a ready-to-use [`BlobStore`].
///
/// Connecting resolves credentials and builds the handle; it performs no
/// network I/O, so authentication problems that only the service can detect
/// surface on the first listing call.
pub trait StoreConnector: Send + Sync {
    /// Builds a store for the given configuration.
    fn connect(&self, config: &ContainerConfig) -> StorageResult<Arc<dyn BlobStore>>;
}

/// Connector for Azure Blob Storage.
///
/// All containers built by one connector share a single HTTP client and its
/// connection pool.
#[derive(Debug, Clone)]
pub struct AzureConnector {
    client: reqwest::Client,
}

impl AzureConnector {
    /// Creates a connector with a new HTTP client.
    pub fn new(config: &StorageClientConfig) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| StorageError::connection(format!("failed to build HTTP client: {e}")))?;

        tracing::debug!(
            target: TRACING_TARGET,
            request_timeout_ms = config.request_timeout.as_millis() as u64,
            "Created storage HTTP client"
        );

        Ok(Self { client })
    }

    /// Creates a connector on top of an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl StoreConnector for AzureConnector {
    fn connect(&self, config: &ContainerConfig) -> StorageResult<Arc<dyn BlobStore>> {
        let access = ResolvedAccess::resolve(config)?;

        tracing::debug!(
            target: TRACING_TARGET,
            container = %access.container,
            endpoint = %access.endpoint,
            auth = access.auth.name(),
            "Connecting to container"
        );

        Ok(Arc::new(AzureContainer::new(self.client.clone(), access)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_requires_credentials() {
        let connector = AzureConnector::new(&StorageClientConfig::default()).unwrap();
        let result = connector.connect(&ContainerConfig::new("photos"));

        assert!(matches!(result, Err(err) if err.is_config()));
    }

    #[test]
    fn connect_anonymous_container() {
        let connector = AzureConnector::new(&StorageClientConfig::default()).unwrap();
        let config =
            ContainerConfig::new("photos").with_account_url("https://acct.blob.core.windows.net");
        let store = connector.connect(&config).unwrap();

        assert_eq!(
            store.identity(),
            "https://acct.blob.core.windows.net/photos"
        );
    }
}
