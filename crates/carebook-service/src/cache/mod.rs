//! Caching infrastructure for the service layer.
//!
//! A [`CacheStore`] capability with Redis and in-memory implementations,
//! the cache key builder, and the event reporting used by the cache-aside
//! read and write paths.

mod cache_aside;
pub mod cache_keys;
pub mod events;
mod redis_store;
mod store;

pub(crate) use cache_aside::{invalidate, read_through, with_deadline};
pub use cache_keys::{CacheKey, CacheKeys, KeyFamily};
pub use events::{record, CacheEvent};
pub use redis_store::RedisCacheStore;
pub use store::{CacheStore, MemoryCacheStore};
