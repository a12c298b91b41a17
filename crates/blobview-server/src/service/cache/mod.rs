//! Shared caches.

mod content_cache;

pub use content_cache::ContentCache;
