//! # Carebook Server Library
//!
//! Dependency injection wiring and process-level telemetry for the
//! Carebook server binary.

pub mod di;
pub mod telemetry;
