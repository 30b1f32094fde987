//! In-memory address repository.

use crate::AddressRepository;
use async_trait::async_trait;
use carebook_core::{
    Address, AddressDraft, AddressId, CarebookError, CarebookResult, PatientId,
};
use parking_lot::RwLock;
use shaku::Component;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// In-memory address repository. Keyed by address id across all patients.
#[derive(Component, Default)]
#[shaku(interface = AddressRepository)]
pub struct MemoryAddressRepository {
    records: RwLock<BTreeMap<AddressId, Address>>,
}

impl MemoryAddressRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AddressRepository for MemoryAddressRepository {
    async fn list_by_patient_id(&self, patient_id: &PatientId) -> CarebookResult<Vec<Address>> {
        debug!("Listing addresses for patient: {}", patient_id);

        let mut addresses: Vec<Address> = self
            .records
            .read()
            .values()
            .filter(|a| &a.patient_id == patient_id)
            .cloned()
            .collect();
        addresses.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(addresses)
    }

    async fn find_by_id(
        &self,
        patient_id: &PatientId,
        address_id: &AddressId,
    ) -> CarebookResult<Address> {
        debug!("Finding address {} of patient {}", address_id, patient_id);

        self.records
            .read()
            .get(address_id)
            .filter(|a| &a.patient_id == patient_id)
            .cloned()
            .ok_or_else(|| CarebookError::not_found("Address", address_id))
    }

    async fn upsert(&self, patient_id: &PatientId, draft: AddressDraft) -> CarebookResult<Address> {
        draft.validate()?;
        let id = draft
            .id
            .clone()
            .unwrap_or_else(|| AddressId::generate(patient_id));

        let mut records = self.records.write();
        let created_at = match records.get(&id) {
            Some(existing) if &existing.patient_id != patient_id => {
                return Err(CarebookError::conflict(format!(
                    "address {id} belongs to another patient"
                )));
            }
            Some(existing) => Some(existing.created_at),
            None => None,
        };

        let address = draft.into_address(id.clone(), patient_id.clone(), created_at);
        records.insert(id, address.clone());

        info!("Upserted address {} for patient {}", address.id, patient_id);
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft(id: Option<&str>, line1: &str) -> AddressDraft {
        AddressDraft::new(
            id.map(|id| AddressId::parse(id).unwrap()),
            line1,
            None,
            "Springfield",
            "IL",
            "62701",
        )
    }

    fn pid(id: &str) -> PatientId {
        PatientId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_generates_id_and_stamps_owner() {
        let repo = MemoryAddressRepository::new();

        let address = repo.upsert(&pid("P1"), draft(None, "1 Main St")).await.unwrap();
        assert!(address.id.as_str().starts_with("P1-"));
        assert_eq!(address.patient_id, pid("P1"));
        assert_eq!(address.created_at, address.updated_at);

        let found = repo.find_by_id(&pid("P1"), &address.id).await.unwrap();
        assert_eq!(found, address);
    }

    #[tokio::test]
    async fn test_generated_ids_do_not_collide() {
        let repo = MemoryAddressRepository::new();
        for _ in 0..20 {
            repo.upsert(&pid("P1"), draft(None, "1 Main St")).await.unwrap();
        }
        assert_eq!(repo.list_by_patient_id(&pid("P1")).await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_keeps_creation_time() {
        let repo = MemoryAddressRepository::new();
        let first = repo.upsert(&pid("P1"), draft(Some("home"), "1 Main St")).await.unwrap();

        let mut second_draft = draft(Some("home"), "2 Oak Ave");
        second_draft.stamped_at = first.created_at + Duration::seconds(5);
        let second = repo.upsert(&pid("P1"), second_draft).await.unwrap();

        assert_eq!(second.line1, "2 Oak Ave");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(repo.list_by_patient_id(&pid("P1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_caller_id_owned_by_other_patient_conflicts() {
        let repo = MemoryAddressRepository::new();
        repo.upsert(&pid("P1"), draft(Some("home"), "1 Main St")).await.unwrap();

        let err = repo
            .upsert(&pid("P2"), draft(Some("home"), "9 Elm St"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let kept = repo
            .find_by_id(&pid("P1"), &AddressId::parse("home").unwrap())
            .await
            .unwrap();
        assert_eq!(kept.line1, "1 Main St");
    }

    #[tokio::test]
    async fn test_find_by_id_scoped_to_patient() {
        let repo = MemoryAddressRepository::new();
        let address = repo.upsert(&pid("P1"), draft(None, "1 Main St")).await.unwrap();

        let err = repo.find_by_id(&pid("P2"), &address.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_orders_by_creation_then_id() {
        let repo = MemoryAddressRepository::new();
        let base = carebook_core::now_millis();

        for (id, offset) in [("c", 0), ("b", 10), ("a", 10)] {
            let mut d = draft(Some(id), "1 Main St");
            d.stamped_at = base + Duration::seconds(offset);
            repo.upsert(&pid("P1"), d).await.unwrap();
        }
        repo.upsert(&pid("P2"), draft(Some("z"), "1 Main St")).await.unwrap();

        let ids: Vec<String> = repo
            .list_by_patient_id(&pid("P1"))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id.to_string())
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_invalid_draft_rejected() {
        let repo = MemoryAddressRepository::new();
        let mut bad = draft(None, "1 Main St");
        bad.zip = "1234".to_string();

        assert!(repo.upsert(&pid("P1"), bad).await.unwrap_err().is_validation());
        assert!(repo.list_by_patient_id(&pid("P1")).await.unwrap().is_empty());
    }
}
