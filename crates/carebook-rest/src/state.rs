//! Application state for Axum handlers.

use carebook_core::HealthCheck;
use carebook_service::{AddressService, PatientService};
use shaku::{HasComponent, Module};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub patient_service: Arc<dyn PatientService>,
    pub address_service: Arc<dyn AddressService>,
    /// Checks run by the readiness endpoint.
    pub health_checks: Arc<[Arc<dyn HealthCheck>]>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        patient_service: Arc<dyn PatientService>,
        address_service: Arc<dyn AddressService>,
        health_checks: Vec<Arc<dyn HealthCheck>>,
    ) -> Self {
        Self {
            patient_service,
            address_service,
            health_checks: health_checks.into(),
        }
    }

    /// Resolves the services from a Shaku module.
    pub fn from_module<M>(module: &M, health_checks: Vec<Arc<dyn HealthCheck>>) -> Self
    where
        M: Module + HasComponent<dyn PatientService> + HasComponent<dyn AddressService>,
    {
        Self::new(module.resolve(), module.resolve(), health_checks)
    }
}
