//! In-memory blob store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use blobview_core::{ContinuationToken, ListPage, PageSize, is_image_name};
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::auth::{AuthMode, ResolvedAccess};
use crate::config::ContainerConfig;
use crate::connector::StoreConnector;
use crate::error::{StorageError, StorageResult};
use crate::store::BlobStore;

/// A container held in memory, listed in name order.
///
/// Continuation tokens encode the position of the next blob in a way callers
/// must treat as opaque, the same as the service does. Listing and read
/// failures can be injected to exercise error paths.
///
/// Each handle carries the credentials it was connected with. Handles share
/// the blobs, and a [private](Self::make_private) container refuses
/// anonymous handles.
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    inner: Arc<MemoryInner>,
    anonymous: bool,
    credential: String,
}

#[derive(Debug)]
struct MemoryInner {
    identity: String,
    blobs: RwLock<BTreeMap<String, Bytes>>,
    failing_reads: RwLock<HashSet<String>>,
    slow_reads: RwLock<HashMap<String, Duration>>,
    fail_next_listings: AtomicUsize,
    listing_calls: AtomicUsize,
    private: AtomicBool,
}

impl MemoryContainer {
    /// Creates an empty container and an anonymous handle to it.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                identity: identity.into(),
                blobs: RwLock::default(),
                failing_reads: RwLock::default(),
                slow_reads: RwLock::default(),
                fail_next_listings: AtomicUsize::new(0),
                listing_calls: AtomicUsize::new(0),
                private: AtomicBool::new(false),
            }),
            anonymous: true,
            credential: AuthMode::Anonymous.fingerprint(),
        }
    }

    /// Returns a handle to the same blobs authorized with `auth`.
    pub fn authorized_as(&self, auth: &AuthMode) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            anonymous: matches!(auth, AuthMode::Anonymous),
            credential: auth.fingerprint(),
        }
    }

    /// Refuses listings and reads from anonymous handles from now on.
    pub fn make_private(&self) {
        self.inner.private.store(true, Ordering::SeqCst);
    }

    /// Stores a blob, replacing any previous content.
    pub async fn insert(&self, name: impl Into<String>, content: impl Into<Bytes>) {
        self.inner
            .blobs
            .write()
            .await
            .insert(name.into(), content.into());
    }

    /// Makes the next `count` listing calls fail.
    pub fn fail_next_listings(&self, count: usize) {
        self.inner.fail_next_listings.store(count, Ordering::SeqCst);
    }

    /// Makes every read of `name` fail.
    pub async fn fail_reads_of(&self, name: impl Into<String>) {
        self.inner.failing_reads.write().await.insert(name.into());
    }

    /// Delays every read of `name` by `delay`.
    pub async fn delay_reads_of(&self, name: impl Into<String>, delay: Duration) {
        self.inner.slow_reads.write().await.insert(name.into(), delay);
    }

    /// Returns how many listing calls were made, failed ones included.
    pub fn listing_calls(&self) -> usize {
        self.inner.listing_calls.load(Ordering::SeqCst)
    }

    fn take_listing_failure(&self) -> bool {
        self.inner
            .fail_next_listings
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn check_access(&self) -> StorageResult<()> {
        if self.anonymous && self.inner.private.load(Ordering::SeqCst) {
            return Err(StorageError::permission_denied(format!(
                "{} does not allow public access",
                self.inner.identity
            )));
        }
        Ok(())
    }
}

fn encode_position(position: usize) -> ContinuationToken {
    ContinuationToken::new(format!("mem!{position}"))
}

fn decode_position(token: &ContinuationToken) -> StorageResult<usize> {
    token
        .as_str()
        .strip_prefix("mem!")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| StorageError::Http {
            status: 400,
            message: "OutOfRangeInput".to_owned(),
        })
}

#[async_trait]
impl BlobStore for MemoryContainer {
    fn identity(&self) -> &str {
        &self.inner.identity
    }

    fn credential(&self) -> &str {
        &self.credential
    }

    async fn list_page(
        &self,
        prefix: Option<&str>,
        token: Option<&ContinuationToken>,
        page_size: PageSize,
    ) -> StorageResult<ListPage> {
        self.inner.listing_calls.fetch_add(1, Ordering::SeqCst);
        if self.take_listing_failure() {
            return Err(StorageError::injected("listing failure"));
        }
        self.check_access()?;

        let start = token.map(decode_position).transpose()?.unwrap_or(0);
        let prefix = prefix.unwrap_or("");
        let blobs = self.inner.blobs.read().await;

        let matching: Vec<&String> = blobs.keys().filter(|k| k.starts_with(prefix)).collect();
        let end = (start + page_size.get() as usize).min(matching.len());
        let raw = matching.get(start..end).unwrap_or_default();

        let items = raw
            .iter()
            .filter(|name| is_image_name(name))
            .map(|name| (*name).clone())
            .collect();
        let next = (end < matching.len()).then(|| encode_position(end));

        Ok(ListPage::new(items, next))
    }

    async fn read(&self, name: &str) -> StorageResult<Bytes> {
        self.check_access()?;

        let delay = self.inner.slow_reads.read().await.get(name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.inner.failing_reads.read().await.contains(name) {
            return Err(StorageError::injected(format!("read failure for {name}")));
        }

        self.inner
            .blobs
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::not_found(name))
    }
}

/// Connector that hands out registered [`MemoryContainer`]s by name.
///
/// Credentials are resolved the same way as for Azure, so a configuration
/// without any authentication still fails with a configuration error. The
/// returned handle is authorized with the resolved credentials.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    containers: HashMap<String, MemoryContainer>,
}

impl MemoryConnector {
    /// Creates a connector with no containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a container under `name`.
    pub fn with_container(mut self, name: impl Into<String>, container: MemoryContainer) -> Self {
        self.containers.insert(name.into(), container);
        self
    }
}

impl StoreConnector for MemoryConnector {
    fn connect(&self, config: &ContainerConfig) -> StorageResult<Arc<dyn BlobStore>> {
        let access = ResolvedAccess::resolve(config)?;
        let container = self
            .containers
            .get(&access.container)
            .ok_or_else(|| StorageError::not_found(format!("container {}", access.container)))?;

        Ok(Arc::new(container.authorized_as(&access.auth)))
    }
}
