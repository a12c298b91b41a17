//! Blob store abstraction.

use async_trait::async_trait;
use blobview_core::{ContinuationToken, ListPage, PageSize};
use bytes::Bytes;

use crate::error::StorageResult;

/// A single container that can be listed page by page and read blob by blob.
///
/// Implementations perform exactly one listing request per
/// [`list_page`](Self::list_page) call and never retry on their own.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the container identity (endpoint and container name, without
    /// credentials).
    fn identity(&self) -> &str;

    /// Returns a digest of the credentials requests are authorized with.
    ///
    /// Content read through one credential must only be served again to
    /// callers presenting the same one. See [`AuthMode::fingerprint`].
    ///
    /// [`AuthMode::fingerprint`]: crate::AuthMode::fingerprint
    fn credential(&self) -> &str;

    /// Lists at most `page_size` blobs starting at `token`.
    ///
    /// Only image names are returned, so a page may hold fewer items than
    /// requested, or none, while still pointing at a next page. An empty
    /// or absent `prefix` lists the whole container.
    async fn list_page(
        &self,
        prefix: Option<&str>,
        token: Option<&ContinuationToken>,
        page_size: PageSize,
    ) -> StorageResult<ListPage>;

    /// Downloads the content of one blob.
    async fn read(&self, name: &str) -> StorageResult<Bytes>;
}
