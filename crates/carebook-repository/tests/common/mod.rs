//! Common test infrastructure for MongoDB integration tests.

use carebook_config::{DatabaseBackend, DatabaseConfig};
use carebook_repository::{mongo, MongoConnection};
use std::sync::Arc;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::mongo::Mongo;

/// Test database container wrapper.
///
/// Manages a MongoDB testcontainer lifecycle and provides a connection
/// with indexes already in place.
pub struct TestDatabase {
    _container: ContainerAsync<Mongo>,
    connection: Arc<MongoConnection>,
}

impl TestDatabase {
    /// Creates a new test database with a fresh MongoDB container.
    pub async fn new() -> Self {
        let container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let config = DatabaseConfig {
            backend: DatabaseBackend::Mongo,
            uri: format!("mongodb://127.0.0.1:{}", port),
            database: "carebook_test".to_string(),
            connect_timeout_secs: 5,
            create_indexes: true,
        };

        let connection = Self::connect_with_retry(&config, 30).await;

        Self {
            _container: container,
            connection,
        }
    }

    /// Returns the shared connection.
    pub fn connection(&self) -> Arc<MongoConnection> {
        Arc::clone(&self.connection)
    }

    /// Connects to the database with retry logic.
    async fn connect_with_retry(config: &DatabaseConfig, max_attempts: u32) -> Arc<MongoConnection> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match mongo::connect(config).await {
                Ok(connection) => return connection,
                Err(e) => {
                    if attempts >= max_attempts {
                        panic!("Failed to connect to MongoDB after {} attempts: {}", max_attempts, e);
                    }
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                }
            }
        }
    }
}
