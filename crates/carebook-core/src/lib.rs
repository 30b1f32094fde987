//! # Carebook Core
//!
//! Core types, traits, and error definitions for Carebook.
//! This crate provides the patient/address domain model, the query shapes
//! shared by every repository backend, and the validation utilities that
//! stand between user input and the document store.

pub mod domain;
pub mod error;
pub mod id;
pub mod query;
pub mod result;
pub mod traits;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use query::*;
pub use result::*;
pub use traits::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
