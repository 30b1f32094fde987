//! MongoDB address repository implementation.

use super::documents::AddressDocument;
use super::MongoConnection;
use crate::AddressRepository;
use async_trait::async_trait;
use carebook_core::{
    validate_identifier, Address, AddressDraft, AddressId, CarebookError, CarebookResult,
    PatientId,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime, Document};
use mongodb::options::ReturnDocument;
use std::sync::Arc;
use tracing::{debug, info};

/// MongoDB address repository implementation.
#[derive(Clone)]
pub struct MongoAddressRepository {
    connection: Arc<MongoConnection>,
}

impl MongoAddressRepository {
    /// Creates a new MongoDB address repository.
    #[must_use]
    pub fn new(connection: Arc<MongoConnection>) -> Self {
        Self { connection }
    }
}

fn owner_query(patient_id: &PatientId) -> CarebookResult<Document> {
    validate_identifier("patient id", patient_id.as_str())?;
    Ok(doc! { "patient_id": patient_id.as_str() })
}

fn address_query(patient_id: &PatientId, address_id: &AddressId) -> CarebookResult<Document> {
    let mut query = owner_query(patient_id)?;
    validate_identifier("address id", address_id.as_str())?;
    query.insert("address_id", address_id.as_str());
    Ok(query)
}

#[async_trait]
impl AddressRepository for MongoAddressRepository {
    async fn list_by_patient_id(&self, patient_id: &PatientId) -> CarebookResult<Vec<Address>> {
        debug!("Listing addresses for patient: {}", patient_id);

        let documents: Vec<AddressDocument> = self
            .connection
            .addresses()
            .find(owner_query(patient_id)?)
            .sort(doc! { "created_at": 1, "address_id": 1 })
            .await?
            .try_collect()
            .await?;

        Ok(documents.into_iter().map(Address::from).collect())
    }

    async fn find_by_id(
        &self,
        patient_id: &PatientId,
        address_id: &AddressId,
    ) -> CarebookResult<Address> {
        debug!("Finding address {} of patient {}", address_id, patient_id);

        self.connection
            .addresses()
            .find_one(address_query(patient_id, address_id)?)
            .await?
            .map(Address::from)
            .ok_or_else(|| CarebookError::not_found("Address", address_id))
    }

    async fn upsert(&self, patient_id: &PatientId, draft: AddressDraft) -> CarebookResult<Address> {
        draft.validate()?;
        let id = draft
            .id
            .clone()
            .unwrap_or_else(|| AddressId::generate(patient_id));
        let query = address_query(patient_id, &id)?;

        let addresses = self.connection.addresses();
        let foreign_owner = addresses
            .find_one(doc! {
                "address_id": id.as_str(),
                "patient_id": { "$ne": patient_id.as_str() },
            })
            .await?
            .is_some();
        if foreign_owner {
            return Err(CarebookError::conflict(format!(
                "address {id} belongs to another patient"
            )));
        }

        let stamped_at = DateTime::from_chrono(draft.stamped_at);
        let update = doc! {
            "$set": {
                "line1": draft.line1.as_str(),
                "line2": draft.line2.as_deref(),
                "city": draft.city.as_str(),
                "state": draft.state.as_str(),
                "zip": draft.zip.as_str(),
                "updated_at": stamped_at,
            },
            "$setOnInsert": { "created_at": stamped_at },
        };

        let stored = addresses
            .find_one_and_update(query, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| CarebookError::internal("upsert returned no document"))?;

        info!("Upserted address {} for patient {}", id, patient_id);
        Ok(stored.into())
    }
}
