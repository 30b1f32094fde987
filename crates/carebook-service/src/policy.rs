//! Cache and deadline policy shared by the services.

use carebook_config::{CacheConfig, ServicePolicyConfig};
use std::time::Duration;

/// TTLs, the repository deadline, and the key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePolicy {
    /// TTL for single-entity reads.
    pub entity_ttl: Duration,
    /// TTL for list reads.
    pub list_ttl: Duration,
    /// TTL for count reads.
    pub count_ttl: Duration,
    /// Deadline for every repository and cache call.
    pub operation_timeout: Duration,
    /// Prefix for every cache key.
    pub key_prefix: String,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default(), &ServicePolicyConfig::default())
    }
}

impl ServicePolicy {
    /// Builds the policy from configuration.
    #[must_use]
    pub fn from_config(cache: &CacheConfig, service: &ServicePolicyConfig) -> Self {
        Self {
            entity_ttl: cache.entity_ttl(),
            list_ttl: cache.list_ttl(),
            count_ttl: cache.count_ttl(),
            operation_timeout: service.operation_timeout(),
            key_prefix: cache.prefix.clone(),
        }
    }

    /// Sets the operation deadline.
    #[must_use]
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}
