//! Address service implementation.

use crate::address_service::AddressService;
use crate::cache::{invalidate, read_through, with_deadline, CacheKeys, CacheStore};
use crate::dto::UpsertAddressRequest;
use crate::policy::ServicePolicy;
use async_trait::async_trait;
use carebook_core::{
    Address, AddressDraft, AddressId, CarebookResult, PatientId, ValidateExt,
};
use carebook_repository::AddressRepository;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

/// Address service component for Shaku DI.
///
/// Both address key families are dropped on every upsert: the single
/// address and the owning patient's listing.
#[derive(Component)]
#[shaku(interface = AddressService)]
pub struct AddressServiceComponent {
    #[shaku(inject)]
    address_repository: Arc<dyn AddressRepository>,
    #[shaku(inject)]
    cache: Arc<dyn CacheStore>,
    #[shaku(default = ServicePolicy::default())]
    policy: ServicePolicy,
}

impl AddressServiceComponent {
    /// Creates a service outside of a DI module.
    #[must_use]
    pub fn new(
        address_repository: Arc<dyn AddressRepository>,
        cache: Arc<dyn CacheStore>,
        policy: ServicePolicy,
    ) -> Self {
        Self {
            address_repository,
            cache,
            policy,
        }
    }

    fn keys(&self) -> CacheKeys<'_> {
        CacheKeys::new(&self.policy.key_prefix)
    }
}

#[async_trait]
impl AddressService for AddressServiceComponent {
    async fn get_by_patient_id(&self, patient_id: &str) -> CarebookResult<Vec<Address>> {
        let patient_id = PatientId::parse(patient_id)?;
        debug!("Listing addresses of patient: {}", patient_id);

        let key = self.keys().addresses_by_patient(patient_id.as_str());
        read_through(
            self.cache.as_ref(),
            &key,
            self.policy.entity_ttl,
            self.policy.operation_timeout,
            || self.address_repository.list_by_patient_id(&patient_id),
        )
        .await
    }

    async fn get_by_id(&self, patient_id: &str, address_id: &str) -> CarebookResult<Address> {
        let patient_id = PatientId::parse(patient_id)?;
        let address_id = AddressId::parse(address_id)?;
        debug!("Getting address {} of patient {}", address_id, patient_id);

        let key = self
            .keys()
            .address_by_id(patient_id.as_str(), address_id.as_str());
        read_through(
            self.cache.as_ref(),
            &key,
            self.policy.entity_ttl,
            self.policy.operation_timeout,
            || self.address_repository.find_by_id(&patient_id, &address_id),
        )
        .await
    }

    async fn upsert(
        &self,
        patient_id: &str,
        address_id: Option<&str>,
        request: UpsertAddressRequest,
    ) -> CarebookResult<Address> {
        request.validate_request()?;
        let patient_id = PatientId::parse(patient_id)?;
        let address_id = address_id.map(AddressId::parse).transpose()?;
        debug!("Upserting address for patient: {}", patient_id);

        let draft = AddressDraft::new(
            address_id,
            request.line1,
            request.line2,
            request.city,
            request.state,
            request.zip,
        );
        draft.validate()?;

        let address = with_deadline(
            self.policy.operation_timeout,
            "address upsert",
            self.address_repository.upsert(&patient_id, draft),
        )
        .await?;

        let keys = self.keys();
        invalidate(
            self.cache.as_ref(),
            &[
                keys.address_by_id(patient_id.as_str(), address.id.as_str()),
                keys.addresses_by_patient(patient_id.as_str()),
            ],
            self.policy.operation_timeout,
        )
        .await;

        info!("Address {} upserted for patient {}", address.id, patient_id);
        Ok(address)
    }
}

impl std::fmt::Debug for AddressServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressServiceComponent")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use carebook_repository::MemoryAddressRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts repository reads on top of the in-memory backend.
    #[derive(Default)]
    struct CountingRepository {
        inner: MemoryAddressRepository,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl AddressRepository for CountingRepository {
        async fn list_by_patient_id(&self, patient_id: &PatientId) -> CarebookResult<Vec<Address>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.list_by_patient_id(patient_id).await
        }

        async fn find_by_id(
            &self,
            patient_id: &PatientId,
            address_id: &AddressId,
        ) -> CarebookResult<Address> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_id(patient_id, address_id).await
        }

        async fn upsert(
            &self,
            patient_id: &PatientId,
            draft: AddressDraft,
        ) -> CarebookResult<Address> {
            self.inner.upsert(patient_id, draft).await
        }
    }

    fn request(line1: &str) -> UpsertAddressRequest {
        UpsertAddressRequest {
            line1: line1.to_string(),
            line2: Some("  ".to_string()),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
        }
    }

    fn service() -> (AddressServiceComponent, Arc<CountingRepository>) {
        let repository = Arc::new(CountingRepository::default());
        let service = AddressServiceComponent::new(
            repository.clone(),
            Arc::new(MemoryCacheStore::new()),
            ServicePolicy::default(),
        );
        (service, repository)
    }

    #[tokio::test]
    async fn test_upsert_generates_id_for_patient() {
        let (service, _) = service();

        let address = service.upsert("P100", None, request("1 Main St")).await.unwrap();

        assert!(address.id.as_str().starts_with("P100-"));
        assert_eq!(address.patient_id.as_str(), "P100");
        assert!(address.line2.is_none());
        assert_eq!(service.get_by_id("P100", address.id.as_str()).await.unwrap(), address);
    }

    #[tokio::test]
    async fn test_listing_is_cached_until_upsert() {
        let (service, repository) = service();
        service.upsert("P100", Some("A1"), request("1 Main St")).await.unwrap();

        assert_eq!(service.get_by_patient_id("P100").await.unwrap().len(), 1);
        assert_eq!(service.get_by_patient_id("P100").await.unwrap().len(), 1);
        assert_eq!(repository.reads.load(Ordering::SeqCst), 1);

        service.upsert("P100", Some("A2"), request("2 Main St")).await.unwrap();
        assert_eq!(service.get_by_patient_id("P100").await.unwrap().len(), 2);
        assert_eq!(repository.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_upsert_with_existing_id_invalidates_address() {
        let (service, _) = service();
        service.upsert("P100", Some("A1"), request("1 Main St")).await.unwrap();
        assert_eq!(service.get_by_id("P100", "A1").await.unwrap().line1, "1 Main St");

        service.upsert("P100", Some("A1"), request("9 Elm St")).await.unwrap();

        assert_eq!(service.get_by_id("P100", "A1").await.unwrap().line1, "9 Elm St");
    }

    #[tokio::test]
    async fn test_foreign_address_id_is_conflict() {
        let (service, _) = service();
        service.upsert("P100", Some("A1"), request("1 Main St")).await.unwrap();

        let err = service
            .upsert("P200", Some("A1"), request("2 Main St"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert!(service.get_by_id("P200", "A1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let (service, repository) = service();

        assert!(service.get_by_id("P1;admin:all", "A1").await.unwrap_err().is_validation());
        assert!(service.get_by_patient_id("").await.unwrap_err().is_validation());

        let mut bad_zip = request("1 Main St");
        bad_zip.zip = "6270a".to_string();
        assert!(service.upsert("P100", None, bad_zip).await.unwrap_err().is_validation());

        let mut bad_state = request("1 Main St");
        bad_state.state = "il".to_string();
        assert!(service.upsert("P100", None, bad_state).await.unwrap_err().is_validation());

        assert_eq!(repository.reads.load(Ordering::SeqCst), 0);
    }
}
