//! Prelude module for convenient imports.

pub use crate::config::{ContainerConfig, StorageClientConfig};
pub use crate::connector::{AzureConnector, StoreConnector};
pub use crate::error::{StorageError, StorageResult};
#[cfg(feature = "memory")]
pub use crate::memory::{MemoryConnector, MemoryContainer};
pub use crate::store::BlobStore;
