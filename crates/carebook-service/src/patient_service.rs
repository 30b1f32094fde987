//! Patient service trait definition.

use crate::dto::{CreatePatientRequest, UpdatePatientRequest};
use async_trait::async_trait;
use carebook_core::{CarebookResult, Interface, Patient, PatientFilter, PatientQuery};

/// Cache-aside patient service.
///
/// Reads go through the cache; writes go to the repository and then drop
/// the by-id key of the affected patient. List and count entries expire on
/// their TTL only.
#[async_trait]
pub trait PatientService: Interface + Send + Sync {
    /// Lists one page of patients.
    async fn list(&self, query: &PatientQuery) -> CarebookResult<Vec<Patient>>;

    /// Gets a patient by ID.
    async fn get_by_id(&self, id: &str) -> CarebookResult<Patient>;

    /// Creates a patient. The creation time is stamped by the server.
    async fn create(&self, request: CreatePatientRequest) -> CarebookResult<Patient>;

    /// Updates a patient. The edit time is stamped by the server.
    async fn update(&self, id: &str, request: UpdatePatientRequest) -> CarebookResult<Patient>;

    /// Counts patients matching `filter`.
    async fn count(&self, filter: &PatientFilter) -> CarebookResult<u64>;
}
