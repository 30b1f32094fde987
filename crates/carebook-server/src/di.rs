//! Dependency injection module using Shaku.
//!
//! `CarebookModule` registers the in-memory components. The configured
//! MongoDB and Redis adapters replace them through component overrides,
//! so every backend combination resolves to the same service graph.

use carebook_config::{AppConfig, CacheBackend, DatabaseBackend};
use carebook_core::{CarebookResult, HealthCheck};
use carebook_repository::{
    mongo, AddressRepository, MemoryAddressRepository, MemoryPatientRepository,
    MongoAddressRepository, MongoConnection, MongoPatientRepository, PatientRepository,
};
use carebook_service::{
    AddressService, AddressServiceComponent, AddressServiceComponentParameters, CacheStore,
    MemoryCacheStore, PatientService, PatientServiceComponent, PatientServiceComponentParameters,
    RedisCacheStore, ServicePolicy,
};
use shaku::{module, HasComponent};
use std::sync::Arc;
use tracing::{info, warn};

module! {
    pub CarebookModule {
        components = [
            MemoryPatientRepository,
            MemoryAddressRepository,
            MemoryCacheStore,
            PatientServiceComponent,
            AddressServiceComponent,
        ],
        providers = [],
    }
}

/// A built module plus the resources the process owns alongside it.
pub struct Wiring {
    pub module: Arc<CarebookModule>,
    /// Checks backing the readiness endpoint.
    pub health_checks: Vec<Arc<dyn HealthCheck>>,
    mongo: Option<Arc<MongoConnection>>,
}

impl Wiring {
    /// Resolves the patient service.
    pub fn patient_service(&self) -> Arc<dyn PatientService> {
        self.module.resolve()
    }

    /// Resolves the address service.
    pub fn address_service(&self) -> Arc<dyn AddressService> {
        self.module.resolve()
    }

    /// Resolves the cache store shared by both services.
    pub fn cache(&self) -> Arc<dyn CacheStore> {
        self.module.resolve()
    }

    /// Releases the cache pool and the database client.
    pub async fn shutdown(&self) {
        if let Err(e) = self.cache().close().await {
            warn!("Failed to close cache store: {}", e);
        }
        if let Some(mongo) = &self.mongo {
            mongo.close().await;
        }
    }
}

/// Builds the module for the configured backends.
pub async fn build_module(config: &AppConfig) -> CarebookResult<Wiring> {
    let policy = ServicePolicy::from_config(&config.cache, &config.service);

    let mut builder = CarebookModule::builder()
        .with_component_parameters::<PatientServiceComponent>(PatientServiceComponentParameters {
            policy: policy.clone(),
        })
        .with_component_parameters::<AddressServiceComponent>(AddressServiceComponentParameters {
            policy,
        });

    let mut health_checks: Vec<Arc<dyn HealthCheck>> = Vec::new();
    let mut mongo_connection = None;

    match config.database.backend {
        DatabaseBackend::Mongo => {
            let connection = mongo::connect(&config.database).await?;
            builder = builder
                .with_component_override::<dyn PatientRepository>(Box::new(
                    MongoPatientRepository::new(connection.clone()),
                ))
                .with_component_override::<dyn AddressRepository>(Box::new(
                    MongoAddressRepository::new(connection.clone()),
                ));
            health_checks.push(connection.clone());
            mongo_connection = Some(connection);
        }
        DatabaseBackend::Memory => {
            warn!("Using the in-memory record store; records are lost on restart");
        }
    }

    match config.cache.backend {
        CacheBackend::Redis => {
            let store = RedisCacheStore::connect(&config.cache)?;
            health_checks.push(Arc::new(store.clone()));
            builder = builder.with_component_override::<dyn CacheStore>(Box::new(store));
        }
        CacheBackend::Memory => {
            info!(
                "Using the in-process cache store (max {} entries)",
                config.cache.memory_max_entries
            );
            builder = builder.with_component_override::<dyn CacheStore>(Box::new(
                MemoryCacheStore::with_capacity(config.cache.memory_max_entries),
            ));
        }
        CacheBackend::Disabled => {
            info!("Caching disabled");
            builder = builder
                .with_component_override::<dyn CacheStore>(Box::new(RedisCacheStore::disabled()));
        }
    }

    info!(
        "Backends: database={}, cache={}",
        config.database.backend, config.cache.backend
    );

    Ok(Wiring {
        module: Arc::new(builder.build()),
        health_checks,
        mongo: mongo_connection,
    })
}
