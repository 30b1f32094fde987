//! Address service trait definition.

use crate::dto::UpsertAddressRequest;
use async_trait::async_trait;
use carebook_core::{Address, CarebookResult, Interface};

/// Cache-aside address service.
#[async_trait]
pub trait AddressService: Interface + Send + Sync {
    /// Lists every address of a patient.
    async fn get_by_patient_id(&self, patient_id: &str) -> CarebookResult<Vec<Address>>;

    /// Gets one address of a patient.
    async fn get_by_id(&self, patient_id: &str, address_id: &str) -> CarebookResult<Address>;

    /// Inserts or replaces an address of a patient.
    ///
    /// Without `address_id` a new identifier is generated.
    async fn upsert(
        &self,
        patient_id: &str,
        address_id: Option<&str>,
        request: UpsertAddressRequest,
    ) -> CarebookResult<Address>;
}
