#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod auth;
mod azure;
mod config;
mod connector;
mod error;
#[cfg(feature = "memory")]
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
mod memory;
mod store;

#[doc(hidden)]
pub mod prelude;

pub use auth::{AuthMode, ConnectionString, ResolvedAccess};
pub use azure::{AZURE_API_VERSION, AzureContainer};
pub use config::{ContainerConfig, StorageClientConfig};
pub use connector::{AzureConnector, StoreConnector};
pub use error::{StorageError, StorageResult};
#[cfg(feature = "memory")]
pub use memory::{MemoryConnector, MemoryContainer};
pub use store::BlobStore;

/// Tracing target for storage operations.
pub const TRACING_TARGET: &str = "blobview_storage";
