//! # Carebook Repository
//!
//! Data access for patients and addresses, behind two traits with two
//! interchangeable backends:
//!
//! ```text
//! Service
//!   ↓  Arc<dyn PatientRepository> / Arc<dyn AddressRepository>
//! MemoryPatientRepository        MongoPatientRepository
//! MemoryAddressRepository        MongoAddressRepository
//!   ↓                              ↓
//! RwLock<BTreeMap>               MongoDB (patients, addresses)
//! ```
//!
//! Identifiers are re-validated and name filters regex-escaped before they
//! reach a MongoDB query document.

pub mod memory;
pub mod mongo;
pub mod traits;

pub use memory::*;
pub use mongo::{MongoAddressRepository, MongoConnection, MongoPatientRepository};
pub use traits::*;
