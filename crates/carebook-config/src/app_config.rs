//! Application configuration structures.

use crate::{CacheBackend, DatabaseBackend};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Record store configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Read-through cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Service layer policy.
    #[serde(default)]
    pub service: ServicePolicyConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "carebook".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Enable CORS.
    pub cors_enabled: bool,
    /// CORS allowed origins.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// Returns the bind address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the request timeout as a Duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Which backend holds the records.
    pub backend: DatabaseBackend,
    /// MongoDB connection string.
    pub uri: String,
    /// MongoDB database name.
    pub database: String,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Create the unique and lookup indexes on startup.
    pub create_indexes: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Mongo,
            uri: "mongodb://localhost:27017".to_string(),
            database: "carebook".to_string(),
            connect_timeout_secs: 10,
            create_indexes: true,
        }
    }
}

impl DatabaseConfig {
    /// Returns the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Read-through cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Which backend stores cache entries.
    pub backend: CacheBackend,
    /// Redis URL.
    pub url: String,
    /// Redis connection pool size.
    pub pool_size: usize,
    /// TTL for single-entity reads, in seconds.
    pub entity_ttl_secs: u64,
    /// TTL for list reads, in seconds.
    pub list_ttl_secs: u64,
    /// TTL for count reads, in seconds.
    pub count_ttl_secs: u64,
    /// Prefix prepended to every cache key.
    pub prefix: String,
    /// Entry bound for the in-process cache backend.
    pub memory_max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            entity_ttl_secs: 30 * 60,
            list_ttl_secs: 5 * 60,
            count_ttl_secs: 5 * 60,
            prefix: "carebook:cache".to_string(),
            memory_max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    /// Returns the entity TTL as a Duration.
    #[must_use]
    pub const fn entity_ttl(&self) -> Duration {
        Duration::from_secs(self.entity_ttl_secs)
    }

    /// Returns the list TTL as a Duration.
    #[must_use]
    pub const fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_secs)
    }

    /// Returns the count TTL as a Duration.
    #[must_use]
    pub const fn count_ttl(&self) -> Duration {
        Duration::from_secs(self.count_ttl_secs)
    }
}

/// Service layer policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePolicyConfig {
    /// Deadline for every repository call, in milliseconds.
    pub operation_timeout_ms: u64,
}

impl Default for ServicePolicyConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: 5000,
        }
    }
}

impl ServicePolicyConfig {
    /// Returns the operation timeout as a Duration.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: String,
    /// Install the Prometheus recorder and serve it.
    pub metrics_enabled: bool,
    /// Metrics endpoint path.
    pub metrics_path: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_path: "/metrics".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Returns true if logs should be emitted as JSON lines.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
