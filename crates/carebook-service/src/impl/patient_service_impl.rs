//! Patient service implementation.

use crate::cache::{invalidate, read_through, with_deadline, CacheKeys, CacheStore};
use crate::dto::{CreatePatientRequest, UpdatePatientRequest};
use crate::patient_service::PatientService;
use crate::policy::ServicePolicy;
use async_trait::async_trait;
use carebook_core::{
    now_millis, CarebookResult, Patient, PatientFilter, PatientId, PatientQuery, ValidateExt,
};
use carebook_repository::PatientRepository;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

/// Patient service component for Shaku DI.
#[derive(Component)]
#[shaku(interface = PatientService)]
pub struct PatientServiceComponent {
    #[shaku(inject)]
    patient_repository: Arc<dyn PatientRepository>,
    #[shaku(inject)]
    cache: Arc<dyn CacheStore>,
    #[shaku(default = ServicePolicy::default())]
    policy: ServicePolicy,
}

impl PatientServiceComponent {
    /// Creates a service outside of a DI module.
    #[must_use]
    pub fn new(
        patient_repository: Arc<dyn PatientRepository>,
        cache: Arc<dyn CacheStore>,
        policy: ServicePolicy,
    ) -> Self {
        Self {
            patient_repository,
            cache,
            policy,
        }
    }

    fn keys(&self) -> CacheKeys<'_> {
        CacheKeys::new(&self.policy.key_prefix)
    }
}

#[async_trait]
impl PatientService for PatientServiceComponent {
    async fn list(&self, query: &PatientQuery) -> CarebookResult<Vec<Patient>> {
        debug!(
            "Listing patients, limit: {}, offset: {}",
            query.limit, query.offset
        );
        query.validate()?;

        let key = self.keys().patient_list(query);
        read_through(
            self.cache.as_ref(),
            &key,
            self.policy.list_ttl,
            self.policy.operation_timeout,
            || {
                self.patient_repository
                    .list(&query.filter, query.limit, query.offset)
            },
        )
        .await
    }

    async fn get_by_id(&self, id: &str) -> CarebookResult<Patient> {
        let id = PatientId::parse(id)?;
        debug!("Getting patient: {}", id);

        let key = self.keys().patient_by_id(id.as_str());
        read_through(
            self.cache.as_ref(),
            &key,
            self.policy.entity_ttl,
            self.policy.operation_timeout,
            || self.patient_repository.find_by_id(&id),
        )
        .await
    }

    async fn create(&self, request: CreatePatientRequest) -> CarebookResult<Patient> {
        request.validate_request()?;

        let id = match request.id.as_deref() {
            Some(id) => PatientId::parse(id)?,
            None => PatientId::generate(),
        };
        debug!("Creating patient: {}", id);

        let patient = Patient::new(
            id,
            request.name,
            request.date_of_birth,
            &request.phone,
            request.state,
        )?;

        let created = with_deadline(
            self.policy.operation_timeout,
            "patient create",
            self.patient_repository.create(&patient),
        )
        .await?;

        invalidate(
            self.cache.as_ref(),
            &[self.keys().patient_by_id(created.id.as_str())],
            self.policy.operation_timeout,
        )
        .await;

        info!("Patient created: {}", created.id);
        Ok(created)
    }

    async fn update(&self, id: &str, request: UpdatePatientRequest) -> CarebookResult<Patient> {
        request.validate_request()?;
        let id = PatientId::parse(id)?;
        debug!("Updating patient: {}", id);

        let mut changes = Patient::new(
            id.clone(),
            request.name,
            request.date_of_birth,
            &request.phone,
            request.state,
        )?;
        changes.edited_by = request
            .edited_by
            .map(|editor| editor.trim().to_string())
            .filter(|editor| !editor.is_empty());
        changes.edited_at = Some(now_millis());
        changes.validate()?;

        let updated = with_deadline(
            self.policy.operation_timeout,
            "patient update",
            self.patient_repository.update(&id, &changes),
        )
        .await?;

        invalidate(
            self.cache.as_ref(),
            &[self.keys().patient_by_id(id.as_str())],
            self.policy.operation_timeout,
        )
        .await;

        info!("Patient updated: {}", id);
        Ok(updated)
    }

    async fn count(&self, filter: &PatientFilter) -> CarebookResult<u64> {
        debug!("Counting patients");
        filter.validate()?;

        let key = self.keys().patient_count(filter);
        read_through(
            self.cache.as_ref(),
            &key,
            self.policy.count_ttl,
            self.policy.operation_timeout,
            || self.patient_repository.count(filter),
        )
        .await
    }
}

impl std::fmt::Debug for PatientServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientServiceComponent")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use carebook_core::CarebookError;
    use carebook_repository::MemoryPatientRepository;
    use chrono::NaiveDate;
    use mockall::mock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Delegates to an in-memory repository and counts `find_by_id` calls.
    #[derive(Default)]
    struct CountingRepository {
        inner: MemoryPatientRepository,
        lookups: AtomicUsize,
        delay: Option<Duration>,
    }

    impl CountingRepository {
        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PatientRepository for CountingRepository {
        async fn list(
            &self,
            filter: &PatientFilter,
            limit: u32,
            offset: u64,
        ) -> CarebookResult<Vec<Patient>> {
            self.inner.list(filter, limit, offset).await
        }

        async fn find_by_id(&self, id: &PatientId) -> CarebookResult<Patient> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.inner.find_by_id(id).await
        }

        async fn create(&self, patient: &Patient) -> CarebookResult<Patient> {
            self.inner.create(patient).await
        }

        async fn update(&self, id: &PatientId, changes: &Patient) -> CarebookResult<Patient> {
            self.inner.update(id, changes).await
        }

        async fn count(&self, filter: &PatientFilter) -> CarebookResult<u64> {
            self.inner.count(filter).await
        }
    }

    mock! {
        Cache {}

        #[async_trait]
        impl CacheStore for Cache {
            async fn get(&self, key: &str) -> CarebookResult<Option<Vec<u8>>>;
            async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CarebookResult<()>;
            async fn delete(&self, key: &str) -> CarebookResult<bool>;
            async fn close(&self) -> CarebookResult<()>;
        }
    }

    /// Cache whose every call hangs far past any service deadline.
    #[derive(Default)]
    struct StalledCache {
        calls: AtomicUsize,
    }

    impl StalledCache {
        async fn stall(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
    }

    #[async_trait]
    impl CacheStore for StalledCache {
        async fn get(&self, _key: &str) -> CarebookResult<Option<Vec<u8>>> {
            self.stall().await;
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CarebookResult<()> {
            self.stall().await;
            Ok(())
        }

        async fn delete(&self, _key: &str) -> CarebookResult<bool> {
            self.stall().await;
            Ok(false)
        }

        async fn close(&self) -> CarebookResult<()> {
            Ok(())
        }
    }

    fn service_with(
        repository: Arc<dyn PatientRepository>,
        cache: Arc<dyn CacheStore>,
    ) -> PatientServiceComponent {
        PatientServiceComponent::new(repository, cache, ServicePolicy::default())
    }

    fn create_request(id: &str, name: &str, phone: &str) -> CreatePatientRequest {
        CreatePatientRequest {
            id: Some(id.to_string()),
            name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 4, 2).unwrap(),
            phone: phone.to_string(),
            state: "CA".to_string(),
        }
    }

    fn update_request(name: &str, phone: &str) -> UpdatePatientRequest {
        UpdatePatientRequest {
            name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 4, 2).unwrap(),
            phone: phone.to_string(),
            state: "CA".to_string(),
            edited_by: Some("dr.who".to_string()),
        }
    }

    #[tokio::test]
    async fn test_repeated_get_hits_repository_once() {
        let repository = Arc::new(CountingRepository::default());
        let service = service_with(repository.clone(), Arc::new(MemoryCacheStore::new()));
        service
            .create(create_request("P100", "Ada", "5551112222"))
            .await
            .unwrap();

        let first = service.get_by_id("P100").await.unwrap();
        let second = service.get_by_id("P100").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(repository.lookups(), 1);
    }

    #[tokio::test]
    async fn test_update_invalidates_cached_patient() {
        let service = service_with(
            Arc::new(MemoryPatientRepository::new()),
            Arc::new(MemoryCacheStore::new()),
        );
        service
            .create(create_request("P100", "Aa", "5551112222"))
            .await
            .unwrap();
        assert_eq!(service.get_by_id("P100").await.unwrap().name, "Aa");

        service
            .update("P100", update_request("Bb", "5551112222"))
            .await
            .unwrap();

        let reread = service.get_by_id("P100").await.unwrap();
        assert_eq!(reread.name, "Bb");
        assert_eq!(reread.edited_by.as_deref(), Some("dr.who"));
        assert!(reread.edited_at.unwrap() >= reread.created_at);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let service = service_with(
            Arc::new(MemoryPatientRepository::new()),
            Arc::new(MemoryCacheStore::new()),
        );
        let before = now_millis();

        let created = service
            .create(create_request("P100", "Ada Lovelace", "(555) 111-2222"))
            .await
            .unwrap();
        let fetched = service.get_by_id("P100").await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.phone, "5551112222");
        assert!(fetched.created_at >= before);
        assert!(fetched.edited_at.is_none());
    }

    #[tokio::test]
    async fn test_generated_id_when_absent() {
        let service = service_with(
            Arc::new(MemoryPatientRepository::new()),
            Arc::new(MemoryCacheStore::new()),
        );
        let mut request = create_request("unused", "Ada", "5551112222");
        request.id = None;

        let created = service.create(request).await.unwrap();
        assert!(created.id.as_str().starts_with('P'));
        assert_eq!(service.get_by_id(created.id.as_str()).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_conflict() {
        let service = service_with(
            Arc::new(MemoryPatientRepository::new()),
            Arc::new(MemoryCacheStore::new()),
        );
        let first = service
            .create(create_request("P1", "Ada", "5551112222"))
            .await
            .unwrap();

        let err = service
            .create(create_request("P2", "Grace", "555-111-2222"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(service.get_by_id("P1").await.unwrap(), first);
        assert!(service.get_by_id("P2").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_id_is_validation_not_not_found() {
        let repository = Arc::new(CountingRepository::default());
        let service = service_with(repository.clone(), Arc::new(MemoryCacheStore::new()));

        let err = service.get_by_id("P1;admin:all").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(repository.lookups(), 0);

        assert!(service.get_by_id("P404").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let repository = Arc::new(CountingRepository::default());
        let service = service_with(repository.clone(), Arc::new(MemoryCacheStore::new()));

        assert!(service.get_by_id("P100").await.unwrap_err().is_not_found());
        service
            .create(create_request("P100", "Ada", "5551112222"))
            .await
            .unwrap();

        assert_eq!(service.get_by_id("P100").await.unwrap().name, "Ada");
        assert_eq!(repository.lookups(), 2);
    }

    #[tokio::test]
    async fn test_cache_failures_are_absorbed() {
        let mut cache = MockCache::new();
        cache
            .expect_get()
            .times(2)
            .returning(|_| Err(CarebookError::Cache("connection refused".to_string())));
        cache
            .expect_set()
            .times(1)
            .returning(|_, _, _| Err(CarebookError::Cache("connection refused".to_string())));
        cache
            .expect_delete()
            .times(2)
            .returning(|_| Err(CarebookError::Cache("connection refused".to_string())));

        let service = service_with(Arc::new(MemoryPatientRepository::new()), Arc::new(cache));

        service
            .create(create_request("P100", "Ada", "5551112222"))
            .await
            .unwrap();
        assert_eq!(service.get_by_id("P100").await.unwrap().name, "Ada");
        service
            .update("P100", update_request("Grace", "5551112222"))
            .await
            .unwrap();
        assert!(service.get_by_id("P404").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_reads_as_miss() {
        let cache = Arc::new(MemoryCacheStore::new());
        let service = service_with(Arc::new(MemoryPatientRepository::new()), cache.clone());
        service
            .create(create_request("P100", "Ada", "5551112222"))
            .await
            .unwrap();

        let key = CacheKeys::new("carebook:cache").patient_by_id("P100");
        cache
            .set(key.as_str(), b"\x00garbage", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(service.get_by_id("P100").await.unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_slow_repository_is_cancelled() {
        let repository = Arc::new(CountingRepository::slow(Duration::from_millis(200)));
        let service = PatientServiceComponent::new(
            repository,
            Arc::new(MemoryCacheStore::new()),
            ServicePolicy::default().with_operation_timeout(Duration::from_millis(20)),
        );

        let err = service.get_by_id("P100").await.unwrap_err();
        assert!(matches!(err, CarebookError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_stalled_cache_is_bounded_by_deadline() {
        let deadline = Duration::from_millis(50);
        let cache = Arc::new(StalledCache::default());
        let service = PatientServiceComponent::new(
            Arc::new(MemoryPatientRepository::new()),
            cache.clone(),
            ServicePolicy::default().with_operation_timeout(deadline),
        );
        service
            .create(create_request("P100", "Ada", "5551112222"))
            .await
            .unwrap();

        let started = std::time::Instant::now();
        assert_eq!(service.get_by_id("P100").await.unwrap().name, "Ada");
        assert!(started.elapsed() < deadline * 6);

        let started = std::time::Instant::now();
        let updated = service
            .update("P100", update_request("Grace", "5551112222"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Grace");
        assert!(started.elapsed() < deadline * 6);

        // create: delete; get: get + set; update: delete
        assert_eq!(cache.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_list_pagination_and_count() {
        let service = service_with(
            Arc::new(MemoryPatientRepository::new()),
            Arc::new(MemoryCacheStore::new()),
        );
        for i in 0..12 {
            service
                .create(create_request(
                    &format!("P{i:03}"),
                    &format!("Patient {i}"),
                    &format!("55500000{i:02}"),
                ))
                .await
                .unwrap();
        }

        let page = |offset| PatientQuery::new(None, Some(5), Some(offset));
        assert_eq!(service.list(&page(10)).await.unwrap().len(), 2);
        assert!(service.list(&page(12)).await.unwrap().is_empty());
        assert!(service.list(&page(40)).await.unwrap().is_empty());
        assert_eq!(service.count(&PatientFilter::default()).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_limit_and_filter() {
        let service = service_with(
            Arc::new(MemoryPatientRepository::new()),
            Arc::new(MemoryCacheStore::new()),
        );

        let too_big = PatientQuery::new(None, Some(500), None);
        assert!(service.list(&too_big).await.unwrap_err().is_validation());

        let blank = PatientFilter::by_name("   ");
        assert!(service.count(&blank).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_regex_metacharacters_match_literally() {
        let service = service_with(
            Arc::new(MemoryPatientRepository::new()),
            Arc::new(MemoryCacheStore::new()),
        );
        service
            .create(create_request("P1", "Ada", "5551112222"))
            .await
            .unwrap();

        for filter in [".*", "(unclosed"] {
            let query = PatientQuery::new(Some(filter.to_string()), None, None);
            assert!(service.list(&query).await.unwrap().is_empty());
        }
    }
}
