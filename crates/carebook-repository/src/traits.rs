//! Repository trait definitions.
//!
//! Both backends honor the same contract:
//!
//! - `list` orders patients by `created_at` descending, ties broken by id
//!   ascending; `offset` past the end yields an empty page, never an error.
//! - `find_by_id` on an absent record is `CarebookError::NotFound`.
//! - `create` and `update` reject a duplicate id or phone with
//!   `CarebookError::Conflict`.
//! - Name filters are literal, case-insensitive substrings.
//! - Addresses list by `created_at` ascending, then id ascending.

use carebook_core::{
    Address, AddressDraft, AddressId, CarebookResult, Interface, Patient, PatientFilter, PatientId,
};
use async_trait::async_trait;

/// Patient repository trait.
#[async_trait]
pub trait PatientRepository: Interface + Send + Sync {
    /// Lists patients matching `filter`, one page at a time.
    ///
    /// `limit` is not capped here; callers validate it.
    async fn list(
        &self,
        filter: &PatientFilter,
        limit: u32,
        offset: u64,
    ) -> CarebookResult<Vec<Patient>>;

    /// Finds a patient by ID.
    async fn find_by_id(&self, id: &PatientId) -> CarebookResult<Patient>;

    /// Saves a new patient.
    async fn create(&self, patient: &Patient) -> CarebookResult<Patient>;

    /// Overwrites the mutable fields of an existing patient.
    ///
    /// The stored id and `created_at` are never changed.
    async fn update(&self, id: &PatientId, changes: &Patient) -> CarebookResult<Patient>;

    /// Counts patients matching `filter`.
    async fn count(&self, filter: &PatientFilter) -> CarebookResult<u64>;
}

/// Address repository trait.
#[async_trait]
pub trait AddressRepository: Interface + Send + Sync {
    /// Lists every address of a patient.
    async fn list_by_patient_id(&self, patient_id: &PatientId) -> CarebookResult<Vec<Address>>;

    /// Finds one address of a patient.
    async fn find_by_id(
        &self,
        patient_id: &PatientId,
        address_id: &AddressId,
    ) -> CarebookResult<Address>;

    /// Inserts or replaces an address owned by `patient_id`.
    ///
    /// A draft without an id gets `{patient_id}-{suffix}`. An id already
    /// owned by a different patient is a `Conflict`.
    async fn upsert(&self, patient_id: &PatientId, draft: AddressDraft) -> CarebookResult<Address>;
}
