//! Cache-aside read and write paths.
//!
//! Cache failures of every kind are absorbed here and reported through
//! [`record`]; only repository errors and elapsed deadlines reach the
//! caller.

use super::events::{record, record_load, CacheEvent};
use super::{CacheKey, CacheStore};
use carebook_core::{CarebookError, CarebookResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::{Duration, Instant};

/// Bounds `fut` by `deadline`. Elapse yields `CarebookError::Cancelled`.
pub(crate) async fn with_deadline<T, Fut>(
    deadline: Duration,
    operation: &str,
    fut: Fut,
) -> CarebookResult<T>
where
    Fut: Future<Output = CarebookResult<T>>,
{
    tokio::time::timeout(deadline, fut).await.map_err(|_| {
        CarebookError::Cancelled(format!("{operation} exceeded {}ms", deadline.as_millis()))
    })?
}

/// Serves `key` from the cache, or runs `load` and caches its result.
///
/// Keys in the invalid namespace skip the cache entirely. Errors from
/// `load` are returned as-is and never cached.
pub(crate) async fn read_through<T, F, Fut>(
    cache: &dyn CacheStore,
    key: &CacheKey,
    ttl: Duration,
    deadline: Duration,
    load: F,
) -> CarebookResult<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = CarebookResult<T>>,
{
    let family = key.family();

    if key.is_invalid() {
        record(family, key.as_str(), &CacheEvent::Bypass);
        return with_deadline(deadline, family.as_str(), load()).await;
    }

    if let Some(value) = lookup(cache, key, deadline).await {
        return Ok(value);
    }

    let started = Instant::now();
    let value = with_deadline(deadline, family.as_str(), load()).await?;
    record_load(family, started.elapsed());

    populate(cache, key, &value, ttl, deadline).await;
    Ok(value)
}

/// Deletes every key a write may have staled. Failures are only reported.
pub(crate) async fn invalidate(cache: &dyn CacheStore, keys: &[CacheKey], deadline: Duration) {
    for key in keys.iter().filter(|key| !key.is_invalid()) {
        let event = match tokio::time::timeout(deadline, cache.delete(key.as_str())).await {
            Ok(Ok(_)) => CacheEvent::Invalidated,
            Ok(Err(e)) => CacheEvent::InvalidateFailed(e.to_string()),
            Err(_) => CacheEvent::InvalidateFailed("timed out".to_string()),
        };
        record(key.family(), key.as_str(), &event);
    }
}

async fn lookup<T: DeserializeOwned>(
    cache: &dyn CacheStore,
    key: &CacheKey,
    deadline: Duration,
) -> Option<T> {
    let (event, value) = match tokio::time::timeout(deadline, cache.get(key.as_str())).await {
        Ok(Ok(Some(bytes))) => match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => (CacheEvent::Hit, Some(value)),
            Err(e) => (CacheEvent::DecodeFailed(e.to_string()), None),
        },
        Ok(Ok(None)) => (CacheEvent::Miss, None),
        Ok(Err(e)) => (CacheEvent::ReadFailed(e.to_string()), None),
        Err(_) => (CacheEvent::ReadFailed("timed out".to_string()), None),
    };
    record(key.family(), key.as_str(), &event);
    value
}

async fn populate<T: Serialize>(
    cache: &dyn CacheStore,
    key: &CacheKey,
    value: &T,
    ttl: Duration,
    deadline: Duration,
) {
    let event = match serde_json::to_vec(value) {
        Ok(bytes) => {
            match tokio::time::timeout(deadline, cache.set(key.as_str(), &bytes, ttl)).await {
                Ok(Ok(())) => CacheEvent::Stored,
                Ok(Err(e)) => CacheEvent::WriteFailed(e.to_string()),
                Err(_) => CacheEvent::WriteFailed("timed out".to_string()),
            }
        }
        Err(e) => CacheEvent::WriteFailed(e.to_string()),
    };
    record(key.family(), key.as_str(), &event);
}
