//! Application state and dependency injection.

mod cache;
mod config;
mod render;
mod session;

use std::sync::Arc;

use blobview_storage::{AzureConnector, StoreConnector};
use tokio::task::JoinHandle;

pub use crate::service::cache::ContentCache;
pub use crate::service::config::ServiceConfig;
pub use crate::service::render::{ItemView, Navigation, Notice, PageView, Viewer};
pub use crate::service::session::{
    SESSION_COOKIE, SessionHandle, SessionStore, SettingsUpdate, ViewerSession, ViewerSettings,
};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    session_store: SessionStore,
    content_cache: ContentCache,
    viewer: Viewer,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Builds the shared storage HTTP client. No storage request is made.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let connector = AzureConnector::new(&config.storage_client_config()).map_err(|e| {
            Error::external("azure storage", "Failed to create storage client").with_source(e)
        })?;

        Ok(Self::with_connector(config, Arc::new(connector)))
    }

    /// Initializes application state around an existing connector.
    pub fn with_connector(config: &ServiceConfig, connector: Arc<dyn StoreConnector>) -> Self {
        let content_cache = ContentCache::new(config.content_cache_bytes);

        Self {
            session_store: SessionStore::new(config.default_settings(), config.session_ttl()),
            viewer: Viewer::new(connector, content_cache.clone())
                .with_image_load_budget(config.image_load_budget()),
            content_cache,
        }
    }

    /// Starts the periodic eviction of idle sessions.
    pub fn spawn_session_sweeper(&self) -> JoinHandle<()> {
        self.session_store.spawn_sweeper()
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(session_store: SessionStore);
impl_di!(content_cache: ContentCache);
impl_di!(viewer: Viewer);
