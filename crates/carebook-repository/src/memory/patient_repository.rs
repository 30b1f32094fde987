//! In-memory patient repository.

use super::saturating_offset;
use crate::PatientRepository;
use async_trait::async_trait;
use carebook_core::{CarebookError, CarebookResult, Patient, PatientFilter, PatientId};
use parking_lot::RwLock;
use shaku::Component;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// In-memory patient repository.
#[derive(Component, Default)]
#[shaku(interface = PatientRepository)]
pub struct MemoryPatientRepository {
    records: RwLock<BTreeMap<PatientId, Patient>>,
}

impl MemoryPatientRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, filter: &PatientFilter) -> Vec<Patient> {
        self.records
            .read()
            .values()
            .filter(|patient| filter.matches(patient))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PatientRepository for MemoryPatientRepository {
    async fn list(
        &self,
        filter: &PatientFilter,
        limit: u32,
        offset: u64,
    ) -> CarebookResult<Vec<Patient>> {
        debug!(limit, offset, "Listing patients");
        filter.validate()?;

        let mut patients = self.matching(filter);
        patients.sort_by(|a, b| {
            (Reverse(a.created_at), &a.id).cmp(&(Reverse(b.created_at), &b.id))
        });

        Ok(patients
            .into_iter()
            .skip(saturating_offset(offset))
            .take(limit as usize)
            .collect())
    }

    async fn find_by_id(&self, id: &PatientId) -> CarebookResult<Patient> {
        debug!("Finding patient by id: {}", id);

        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| CarebookError::not_found("Patient", id))
    }

    async fn create(&self, patient: &Patient) -> CarebookResult<Patient> {
        patient.validate()?;
        let mut records = self.records.write();

        if records.contains_key(&patient.id) {
            return Err(CarebookError::conflict(format!(
                "patient {} already exists",
                patient.id
            )));
        }
        if records.values().any(|p| p.phone == patient.phone) {
            return Err(CarebookError::conflict("phone already registered"));
        }

        records.insert(patient.id.clone(), patient.clone());
        info!("Created patient: {}", patient.id);
        Ok(patient.clone())
    }

    async fn update(&self, id: &PatientId, changes: &Patient) -> CarebookResult<Patient> {
        changes.validate()?;
        let mut records = self.records.write();

        if !records.contains_key(id) {
            return Err(CarebookError::not_found("Patient", id));
        }
        if records
            .values()
            .any(|p| p.phone == changes.phone && &p.id != id)
        {
            return Err(CarebookError::conflict("phone already registered"));
        }

        let patient = records
            .get_mut(id)
            .ok_or_else(|| CarebookError::not_found("Patient", id))?;
        patient.apply_update(changes);

        info!("Updated patient: {}", id);
        Ok(patient.clone())
    }

    async fn count(&self, filter: &PatientFilter) -> CarebookResult<u64> {
        filter.validate()?;
        let records = self.records.read();
        Ok(records.values().filter(|p| filter.matches(p)).count() as u64)
    }
}
