//! # Carebook Config
//!
//! Configuration management for Carebook.
//! Supports layered configuration from files, environment variables,
//! and runtime refresh.

mod app_config;
mod backend;
mod loader;
mod validation;

pub use app_config::*;
pub use backend::*;
pub use loader::*;
pub use validation::*;
