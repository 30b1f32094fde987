//! # Carebook REST
//!
//! JSON API over the patient and address services, built on Axum.
//! Errors render through `CarebookError::status_code`, so a malformed
//! identifier is a 400, a missing record a 404 and a duplicate a 409.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
