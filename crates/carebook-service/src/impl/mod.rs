//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `patient_service.rs`).

pub mod address_service_impl;
pub mod patient_service_impl;

pub use address_service_impl::{AddressServiceComponent, AddressServiceComponentParameters};
pub use patient_service_impl::{PatientServiceComponent, PatientServiceComponentParameters};
