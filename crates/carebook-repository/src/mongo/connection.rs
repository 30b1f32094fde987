//! MongoDB connection management and index bootstrap.

use super::documents::{AddressDocument, PatientDocument};
use super::{ADDRESSES_COLLECTION, PATIENTS_COLLECTION};
use async_trait::async_trait;
use carebook_config::DatabaseConfig;
use carebook_core::{CarebookError, CarebookResult, HealthCheck, HealthStatus};
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::sync::Arc;
use tracing::{info, warn};

/// A handle on the Carebook database.
///
/// Cloning is cheap; the driver pools connections internally.
#[derive(Clone)]
pub struct MongoConnection {
    client: Client,
    database: Database,
}

impl MongoConnection {
    /// Connects and verifies the server answers a ping.
    pub async fn connect(config: &DatabaseConfig) -> CarebookResult<Self> {
        info!("Connecting to MongoDB database {}...", config.database);

        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            CarebookError::Configuration(format!("Invalid MongoDB URI: {}", e))
        })?;
        options.app_name = Some("carebook".to_string());
        options.connect_timeout = Some(config.connect_timeout());
        options.server_selection_timeout = Some(config.connect_timeout());

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        database.run_command(doc! { "ping": 1 }).await.map_err(|e| {
            warn!("Failed to connect to MongoDB: {}", e);
            CarebookError::Database(format!("Failed to connect: {}", e))
        })?;

        info!("MongoDB connection established");
        Ok(Self { client, database })
    }

    /// Returns the patient collection.
    pub(crate) fn patients(&self) -> Collection<PatientDocument> {
        self.database.collection(PATIENTS_COLLECTION)
    }

    /// Returns the address collection.
    pub(crate) fn addresses(&self) -> Collection<AddressDocument> {
        self.database.collection(ADDRESSES_COLLECTION)
    }

    /// Creates the unique and lookup indexes. Idempotent.
    pub async fn ensure_indexes(&self) -> CarebookResult<()> {
        info!("Ensuring MongoDB indexes...");

        self.patients()
            .create_indexes([
                unique_index("patient_id_unique", doc! { "patient_id": 1 }),
                unique_index("phone_unique", doc! { "phone": 1 }),
                IndexModel::builder()
                    .keys(doc! { "created_at": -1, "patient_id": 1 })
                    .options(
                        IndexOptions::builder()
                            .name("created_at_listing".to_string())
                            .build(),
                    )
                    .build(),
            ])
            .await?;

        self.addresses()
            .create_indexes([
                unique_index("address_id_unique", doc! { "address_id": 1 }),
                unique_index(
                    "address_patient_unique",
                    doc! { "address_id": 1, "patient_id": 1 },
                ),
                IndexModel::builder()
                    .keys(doc! { "patient_id": 1 })
                    .options(
                        IndexOptions::builder()
                            .name("patient_lookup".to_string())
                            .build(),
                    )
                    .build(),
            ])
            .await?;

        info!("MongoDB indexes ready");
        Ok(())
    }

    /// Shuts the client down, waiting for in-flight operations.
    pub async fn close(&self) {
        info!("Closing MongoDB client...");
        self.client.clone().shutdown().await;
        info!("MongoDB client closed");
    }
}

impl std::fmt::Debug for MongoConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConnection")
            .field("database", &self.database.name())
            .finish()
    }
}

#[async_trait]
impl HealthCheck for MongoConnection {
    fn name(&self) -> &str {
        "mongodb"
    }

    async fn check(&self) -> HealthStatus {
        match self.database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}

fn unique_index(name: &str, keys: mongodb::bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(name.to_string())
                .unique(true)
                .build(),
        )
        .build()
}

/// Connects, bootstrapping indexes when configured to.
pub async fn connect(config: &DatabaseConfig) -> CarebookResult<Arc<MongoConnection>> {
    let connection = MongoConnection::connect(config).await?;
    if config.create_indexes {
        connection.ensure_indexes().await?;
    }
    Ok(Arc::new(connection))
}
