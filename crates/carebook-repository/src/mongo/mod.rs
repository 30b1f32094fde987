//! MongoDB repository backend.

mod address_repository;
mod connection;
mod documents;
mod patient_repository;

pub use address_repository::MongoAddressRepository;
pub use connection::*;
pub use patient_repository::MongoPatientRepository;

/// Collection holding patient documents.
pub const PATIENTS_COLLECTION: &str = "patients";

/// Collection holding address documents.
pub const ADDRESSES_COLLECTION: &str = "addresses";
