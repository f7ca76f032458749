//! Fragment cache abstraction for inlay.
//!
//! Widget output is cached under a string key with a time-to-live chosen by
//! the marker that requested it. The decoding core only ever talks to the
//! [`FragmentCache`] trait, so the storage mechanism is pluggable.
//!
//! # Implementations
//!
//! - [`NullCache`]: No-op implementation (always misses)
//! - [`MemoryCache`]: In-process map with per-entry deadlines
//! - [`FileCache`]: File-based implementation with version validation
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use inlay_cache::{FragmentCache, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! cache.set("widget_Share_{}", "<div>share</div>", Duration::from_secs(300)).unwrap();
//! assert_eq!(
//!     cache.get("widget_Share_{}").unwrap().as_deref(),
//!     Some("<div>share</div>")
//! );
//! ```

mod file;
mod memory;

use std::time::Duration;

pub use file::FileCache;
pub use memory::MemoryCache;

/// Failure reported by a cache backend.
///
/// Callers are expected to treat these as non-fatal: a failed read is a
/// miss and a failed write is dropped.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// I/O error from a disk-backed cache.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("cache lock poisoned")]
    Poisoned,
}

/// Key-value store for rendered fragments with per-entry expiry.
///
/// Implementations must be safe to share between threads. No transactional
/// guarantees are required: two concurrent writers of the same key simply
/// overwrite each other.
pub trait FragmentCache: Send + Sync {
    /// Retrieve a cached fragment.
    ///
    /// Returns `Ok(None)` when the key is absent or its entry has expired.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a fragment that stays valid for `ttl`.
    ///
    /// Overwrites any existing entry for the same key.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// No-op [`FragmentCache`] that never stores or retrieves data.
///
/// Use when caching is disabled. Every `get` returns `Ok(None)`; every `set`
/// is silently discarded.
pub struct NullCache;

impl FragmentCache for NullCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}
