//! # Carebook Service
//!
//! Cache-aside services over the repositories.
//!
//! ```text
//! handler → Service → CacheStore (hit? return)
//!                   → Repository (miss) → CacheStore (populate) → handler
//! handler → Service → Repository (write) → CacheStore (invalidate)
//! ```

pub mod address_service;
pub mod cache;
pub mod dto;
pub mod r#impl;
pub mod patient_service;
pub mod policy;

pub use address_service::*;
pub use cache::{
    CacheEvent, CacheKey, CacheKeys, CacheStore, KeyFamily, MemoryCacheStore, RedisCacheStore,
};
pub use dto::*;
pub use patient_service::*;
pub use policy::ServicePolicy;
pub use r#impl::*;
