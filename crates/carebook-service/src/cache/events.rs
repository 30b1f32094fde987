//! Cache-aside observability.
//!
//! The read and write paths report what happened as a [`CacheEvent`];
//! [`record`] turns it into a log line and a counter increment. Nothing
//! here returns a value the caller could branch on.

use super::KeyFamily;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;
use tracing::{debug, warn};

/// Metric names for the cache-aside layer.
pub mod names {
    /// Cache events by kind and key family.
    pub const CACHE_EVENTS_TOTAL: &str = "carebook_cache_events_total";
    /// Repository call latency on a cache miss, in seconds.
    pub const REPOSITORY_LOAD_SECONDS: &str = "carebook_repository_load_seconds";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CACHE_EVENTS_TOTAL,
        "Cache-aside events by event kind and key family"
    );
    describe_histogram!(
        names::REPOSITORY_LOAD_SECONDS,
        "Repository call duration on a cache miss, in seconds"
    );
}

/// Something the cache-aside layer observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A cached payload was decoded and returned.
    Hit,
    /// Nothing was cached under the key.
    Miss,
    /// The key lies in the invalid namespace; the cache was skipped.
    Bypass,
    /// A cached payload failed to decode; handled as a miss.
    DecodeFailed(String),
    /// The store failed or timed out on read; handled as a miss.
    ReadFailed(String),
    /// A freshly loaded value was written back.
    Stored,
    /// Writing back failed; the read still succeeds.
    WriteFailed(String),
    /// A key was deleted after a write.
    Invalidated,
    /// Deleting a key failed; the write still succeeds.
    InvalidateFailed(String),
}

impl CacheEvent {
    /// Returns the event name used as a metric label.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Bypass => "bypass",
            Self::DecodeFailed(_) => "decode_failed",
            Self::ReadFailed(_) => "read_failed",
            Self::Stored => "stored",
            Self::WriteFailed(_) => "write_failed",
            Self::Invalidated => "invalidated",
            Self::InvalidateFailed(_) => "invalidate_failed",
        }
    }

    /// Returns true for events that indicate a degraded cache.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::DecodeFailed(_)
                | Self::ReadFailed(_)
                | Self::WriteFailed(_)
                | Self::InvalidateFailed(_)
        )
    }
}

/// Logs `event` for `key` and bumps its counter.
pub fn record(family: KeyFamily, key: &str, event: &CacheEvent) {
    counter!(
        names::CACHE_EVENTS_TOTAL,
        "event" => event.name(),
        "family" => family.as_str()
    )
    .increment(1);

    match event {
        CacheEvent::DecodeFailed(reason)
        | CacheEvent::ReadFailed(reason)
        | CacheEvent::WriteFailed(reason)
        | CacheEvent::InvalidateFailed(reason) => {
            warn!(key, family = family.as_str(), reason = %reason, "cache {}", event.name());
        }
        _ => debug!(key, family = family.as_str(), "cache {}", event.name()),
    }
}

/// Records how long a repository load took.
pub fn record_load(family: KeyFamily, elapsed: Duration) {
    histogram!(names::REPOSITORY_LOAD_SECONDS, "family" => family.as_str())
        .record(elapsed.as_secs_f64());
}
