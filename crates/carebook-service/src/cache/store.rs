//! Cache store capability and its in-memory implementation.

use async_trait::async_trait;
use carebook_config::ConfigValidator;
use carebook_core::{CarebookResult, Interface};
use moka::{future::Cache, Expiry};
use shaku::Component;
use std::time::{Duration, Instant};

/// Entry bound used when no capacity is configured.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Longest lifetime an in-memory entry may be given.
const MAX_ENTRY_TTL: Duration = Duration::from_secs(ConfigValidator::MAX_TTL_SECS);

/// Key/value store backing the read-through cache.
///
/// Every operation is fallible; the services treat all of them as
/// best-effort and never surface their errors.
#[async_trait]
pub trait CacheStore: Interface + Send + Sync {
    /// Returns the stored bytes, or `None` on a miss or expired entry.
    async fn get(&self, key: &str) -> CarebookResult<Option<Vec<u8>>>;

    /// Stores `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CarebookResult<()>;

    /// Removes `key`. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> CarebookResult<bool>;

    /// Releases the store's resources.
    async fn close(&self) -> CarebookResult<()>;
}

/// A cached payload with the TTL it was stored under.
#[derive(Clone)]
pub struct CachedBytes {
    bytes: Vec<u8>,
    ttl: Duration,
}

/// Expires each entry after the TTL given to its latest `set`.
struct PerEntryTtl;

impl Expiry<String, CachedBytes> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedBytes,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedBytes,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

fn bounded_cache(max_entries: u64) -> Cache<String, CachedBytes> {
    Cache::builder()
        .max_capacity(max_entries)
        .expire_after(PerEntryTtl)
        .build()
}

/// Process-local cache store, bounded in size, with per-entry expiry.
#[derive(Component)]
#[shaku(interface = CacheStore)]
pub struct MemoryCacheStore {
    #[shaku(default = bounded_cache(DEFAULT_MAX_ENTRIES))]
    entries: Cache<String, CachedBytes>,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryCacheStore {
    /// Creates an empty store holding up to [`DEFAULT_MAX_ENTRIES`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store holding up to `max_entries`.
    #[must_use]
    pub fn with_capacity(max_entries: u64) -> Self {
        Self {
            entries: bounded_cache(max_entries),
        }
    }

    /// Returns the number of live entries after evicting expired ones.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    /// Returns true if no live entry remains.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> CarebookResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).await.map(|entry| entry.bytes))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CarebookResult<()> {
        let entry = CachedBytes {
            bytes: value.to_vec(),
            ttl: ttl.min(MAX_ENTRY_TTL),
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CarebookResult<bool> {
        Ok(self.entries.remove(key).await.is_some())
    }

    async fn close(&self) -> CarebookResult<()> {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
        Ok(())
    }
}
