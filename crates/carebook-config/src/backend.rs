//! Storage backend selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend holding patient and address records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// MongoDB document store.
    #[default]
    Mongo,
    /// Process-local map. Data is lost on restart.
    Memory,
}

impl DatabaseBackend {
    /// Returns true if records survive a restart.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Mongo)
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mongo => write!(f, "mongo"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Backend of the read-through cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Shared Redis instance.
    #[default]
    Redis,
    /// Process-local map with TTL expiry.
    Memory,
    /// No caching; every read goes to the repository.
    Disabled,
}

impl CacheBackend {
    /// Returns true if the backend talks to an external server.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Redis)
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redis => write!(f, "redis"),
            Self::Memory => write!(f, "memory"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names_round_trip_through_serde() {
        let backend: CacheBackend = serde_json::from_str("\"disabled\"").unwrap();
        assert_eq!(backend, CacheBackend::Disabled);
        assert_eq!(backend.to_string(), "disabled");

        let backend: DatabaseBackend = serde_json::from_str("\"memory\"").unwrap();
        assert!(!backend.is_persistent());
    }
}
