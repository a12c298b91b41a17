//! Size-bounded cache of downloaded blob content.

use std::sync::Arc;

use blobview_storage::{BlobStore, StorageResult};
use bytes::Bytes;
use lru::LruCache;
use tokio::sync::Mutex;

/// Tracing target for content cache operations.
const TRACING_TARGET: &str = "blobview_server::service::content_cache";

/// Cache key: container identity, credential fingerprint and blob name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ContentKey {
    identity: String,
    credential: String,
    name: String,
}

impl ContentKey {
    fn new(store: &dyn BlobStore, name: &str) -> Self {
        Self {
            identity: store.identity().to_owned(),
            credential: store.credential().to_owned(),
            name: name.to_owned(),
        }
    }
}

#[derive(Debug)]
struct CacheInner {
    entries: LruCache<ContentKey, Bytes>,
    total_bytes: usize,
}

impl CacheInner {
    fn insert(&mut self, key: ContentKey, content: Bytes, max_bytes: usize) {
        if content.len() > max_bytes {
            return;
        }

        self.total_bytes += content.len();
        if let Some(replaced) = self.entries.put(key, content) {
            self.total_bytes -= replaced.len();
        }

        while self.total_bytes > max_bytes {
            let Some((_, evicted)) = self.entries.pop_lru() else {
                break;
            };
            self.total_bytes -= evicted.len();
        }
    }
}

/// Blob content shared by every session.
///
/// Entries are keyed by container identity, the credentials the content was
/// read with and blob name. They are never invalidated, and the least
/// recently used ones are evicted once the total size exceeds the configured
/// bound. Blobs larger than the bound are served but not kept. Reading
/// through the cache never touches paging state.
#[derive(Debug, Clone)]
pub struct ContentCache {
    inner: Arc<Mutex<CacheInner>>,
    max_bytes: usize,
}

impl ContentCache {
    /// Creates an empty cache holding at most `max_bytes` of content.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                entries: LruCache::unbounded(),
                total_bytes: 0,
            })),
            max_bytes,
        }
    }

    /// Returns content of `name` previously read through `store`'s
    /// credentials, marking it as recently used.
    pub async fn get(&self, store: &dyn BlobStore, name: &str) -> Option<Bytes> {
        let key = ContentKey::new(store, name);
        self.inner.lock().await.entries.get(&key).cloned()
    }

    /// Returns the content of `name`, downloading it on a miss.
    ///
    /// The lock is not held during the download, so two concurrent misses
    /// for the same blob may both reach the store.
    pub async fn get_or_fetch(&self, store: &dyn BlobStore, name: &str) -> StorageResult<Bytes> {
        if let Some(content) = self.get(store, name).await {
            tracing::trace!(
                target: TRACING_TARGET,
                container = %store.identity(),
                blob = %name,
                "Content cache hit"
            );
            return Ok(content);
        }

        let content = store.read(name).await?;
        self.inner
            .lock()
            .await
            .insert(ContentKey::new(store, name), content.clone(), self.max_bytes);

        tracing::trace!(
            target: TRACING_TARGET,
            container = %store.identity(),
            blob = %name,
            size = content.len(),
            "Content cache miss"
        );

        Ok(content)
    }

    /// Returns the number of cached blobs.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Returns whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    /// Returns the total size of cached content in bytes.
    pub async fn total_bytes(&self) -> usize {
        self.inner.lock().await.total_bytes
    }

    /// Returns the configured capacity in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}
