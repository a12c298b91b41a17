//! Azure Blob Storage REST implementation of [`BlobStore`](crate::BlobStore).

mod client;
mod listing;
mod signing;

pub use client::AzureContainer;

/// Storage service version sent in `x-ms-version`.
pub const AZURE_API_VERSION: &str = "2023-11-03";
