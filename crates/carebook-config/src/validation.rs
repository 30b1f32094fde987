//! Configuration validation module.
//!
//! Collects every problem in one pass and fails fast at startup rather
//! than at the first request.

use crate::{AppConfig, CacheBackend, DatabaseBackend};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { name: String, value: u16 },
    /// Pool size must be at least one.
    EmptyPool { name: String },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { value: usize, maximum: usize },
    /// A required URL is missing.
    MissingUrl { url_type: String },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout or TTL value must be positive.
    NonPositiveDuration { name: String },
    /// TTL exceeds the allowed maximum.
    TtlTooLarge { name: String, value: u64, maximum: u64 },
    /// Cache capacity must be at least one entry.
    ZeroCapacity { name: String },
    /// Database name is empty or carries characters MongoDB rejects.
    InvalidDatabaseName { value: String },
    /// Cache key prefix is empty or carries whitespace.
    InvalidCachePrefix { value: String },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::EmptyPool { name } => write!(f, "Pool size for {} must be at least 1", name),
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::MissingUrl { url_type } => write!(f, "Missing {} URL", url_type),
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveDuration { name } => write!(f, "{} must be greater than 0", name),
            Self::TtlTooLarge {
                name,
                value,
                maximum,
            } => write!(f, "{} of {}s exceeds maximum allowed ({}s)", name, value, maximum),
            Self::ZeroCapacity { name } => write!(f, "{} must be at least 1", name),
            Self::InvalidDatabaseName { value } => write!(f, "Invalid database name: {:?}", value),
            Self::InvalidCachePrefix { value } => {
                write!(f, "Invalid cache key prefix: {:?}", value)
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: {} (must be trace, debug, info, warn, or error)",
                    value
                )
            }
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: {} (must be pretty or json)", value)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Result of configuration validation containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<ConfigValidationError>,
}

impl ValidationResult {
    fn add_error(&mut self, error: ConfigValidationError) {
        self.errors.push(error);
    }

    fn require_ttl(&mut self, name: &str, value: u64, maximum: u64) {
        if value > maximum {
            self.add_error(ConfigValidationError::TtlTooLarge {
                name: name.to_string(),
                value,
                maximum,
            });
        } else {
            self.require_positive(name, value);
        }
    }

    fn require_positive(&mut self, name: &str, value: u64) {
        if value == 0 {
            self.add_error(ConfigValidationError::NonPositiveDuration {
                name: name.to_string(),
            });
        }
    }

    /// Returns true if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the validation errors.
    #[must_use]
    pub fn errors(&self) -> &[ConfigValidationError] {
        &self.errors
    }

    /// Converts to Result, returning Err with all errors if any exist.
    pub fn into_result(self) -> Result<(), Vec<ConfigValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: usize = 1000;
    /// Maximum TTL for any cache family (7 days).
    pub const MAX_TTL_SECS: u64 = 7 * 24 * 60 * 60;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    /// Valid log formats.
    const VALID_LOG_FORMATS: &'static [&'static str] = &["pretty", "json"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut result = ValidationResult::default();

        Self::validate_server(&config.server, &mut result);
        Self::validate_database(&config.database, &mut result);
        Self::validate_cache(&config.cache, &mut result);
        result.require_positive(
            "service.operation_timeout_ms",
            config.service.operation_timeout_ms,
        );
        Self::validate_observability(&config.observability, &mut result);

        result.into_result()
    }

    fn validate_server(config: &crate::ServerConfig, result: &mut ValidationResult) {
        if config.port == 0 {
            result.add_error(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: config.port,
            });
        }
        result.require_positive("server.request_timeout_secs", config.request_timeout_secs);
    }

    fn validate_database(config: &crate::DatabaseConfig, result: &mut ValidationResult) {
        if config.backend != DatabaseBackend::Mongo {
            return;
        }

        if config.uri.trim().is_empty() {
            result.add_error(ConfigValidationError::MissingUrl {
                url_type: "database".to_string(),
            });
        } else if !config.uri.starts_with("mongodb://")
            && !config.uri.starts_with("mongodb+srv://")
        {
            result.add_error(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URI must start with mongodb:// or mongodb+srv://".to_string(),
            });
        }

        // MongoDB forbids these in database names.
        let forbidden = ['/', '\\', '.', ' ', '"', '$', '*', '<', '>', ':', '|', '?'];
        if config.database.is_empty() || config.database.contains(forbidden) {
            result.add_error(ConfigValidationError::InvalidDatabaseName {
                value: config.database.clone(),
            });
        }

        result.require_positive("database.connect_timeout_secs", config.connect_timeout_secs);
    }

    fn validate_cache(config: &crate::CacheConfig, result: &mut ValidationResult) {
        if config.backend == CacheBackend::Disabled {
            return;
        }

        result.require_ttl("cache.entity_ttl_secs", config.entity_ttl_secs, Self::MAX_TTL_SECS);
        result.require_ttl("cache.list_ttl_secs", config.list_ttl_secs, Self::MAX_TTL_SECS);
        result.require_ttl("cache.count_ttl_secs", config.count_ttl_secs, Self::MAX_TTL_SECS);

        if config.backend == CacheBackend::Memory && config.memory_max_entries == 0 {
            result.add_error(ConfigValidationError::ZeroCapacity {
                name: "cache.memory_max_entries".to_string(),
            });
        }

        if config.prefix.is_empty()
            || config
                .prefix
                .chars()
                .any(|c| c.is_whitespace() || c.is_control())
        {
            result.add_error(ConfigValidationError::InvalidCachePrefix {
                value: config.prefix.clone(),
            });
        }

        if config.backend != CacheBackend::Redis {
            return;
        }

        if config.url.trim().is_empty() {
            result.add_error(ConfigValidationError::MissingUrl {
                url_type: "redis".to_string(),
            });
        } else if !config.url.starts_with("redis://") && !config.url.starts_with("rediss://") {
            result.add_error(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        } else if let Err(e) = Url::parse(&config.url) {
            result.add_error(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: e.to_string(),
            });
        }

        if config.pool_size == 0 {
            result.add_error(ConfigValidationError::EmptyPool {
                name: "cache".to_string(),
            });
        } else if config.pool_size > Self::MAX_POOL_SIZE {
            result.add_error(ConfigValidationError::PoolSizeTooLarge {
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_observability(config: &crate::ObservabilityConfig, result: &mut ValidationResult) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }

        let format = config.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogFormat {
                value: config.log_format.clone(),
            });
        }
    }
}

/// Formats validation errors for display.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config_passes() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigValidationError::InvalidPort { name, .. } if name == "server.port"
        )));
    }

    #[test]
    fn test_mongo_backend_requires_uri() {
        let mut config = AppConfig::default();
        config.database.uri = String::new();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors.contains(&ConfigValidationError::MissingUrl {
            url_type: "database".to_string()
        }));
    }

    #[test]
    fn test_memory_backend_ignores_uri() {
        let mut config = AppConfig::default();
        config.database.backend = DatabaseBackend::Memory;
        config.database.uri = String::new();

        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_database_name() {
        let mut config = AppConfig::default();
        config.database.database = "care.book".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::InvalidDatabaseName { .. })));
    }

    #[test]
    fn test_redis_backend_requires_url() {
        let mut config = AppConfig::default();
        config.cache.url = "http://localhost:6379".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigValidationError::InvalidUrl { url_type, .. } if url_type == "redis"
        )));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = AppConfig::default();
        config.cache.backend = CacheBackend::Memory;
        config.cache.count_ttl_secs = 0;

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::NonPositiveDuration {
                name: "cache.count_ttl_secs".to_string()
            }]
        );
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let mut config = AppConfig::default();
        config.cache.backend = CacheBackend::Memory;
        config.cache.entity_ttl_secs = u64::MAX;

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::TtlTooLarge {
                name: "cache.entity_ttl_secs".to_string(),
                value: u64::MAX,
                maximum: ConfigValidator::MAX_TTL_SECS,
            }]
        );

        config.cache.entity_ttl_secs = ConfigValidator::MAX_TTL_SECS;
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_memory_cache_requires_capacity() {
        let mut config = AppConfig::default();
        config.cache.backend = CacheBackend::Memory;
        config.cache.memory_max_entries = 0;

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::ZeroCapacity {
                name: "cache.memory_max_entries".to_string()
            }]
        );
    }

    #[test]
    fn test_disabled_cache_skips_cache_checks() {
        let mut config = AppConfig::default();
        config.cache.backend = CacheBackend::Disabled;
        config.cache.url = String::new();
        config.cache.entity_ttl_secs = 0;

        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_zero_operation_timeout_rejected() {
        let mut config = AppConfig::default();
        config.service.operation_timeout_ms = 0;

        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_invalid_log_settings() {
        let mut config = AppConfig::default();
        config.observability.log_level = "verbose".to_string();
        config.observability.log_format = "xml".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_format_validation_errors() {
        let errors = vec![
            ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: 0,
            },
            ConfigValidationError::MissingUrl {
                url_type: "redis".to_string(),
            },
        ];

        let formatted = format_validation_errors(&errors);
        assert!(formatted.contains("1. Invalid port"));
        assert!(formatted.contains("2. Missing redis URL"));
    }
}
