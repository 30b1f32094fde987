//! MongoDB patient repository implementation.

use super::documents::PatientDocument;
use super::MongoConnection;
use crate::PatientRepository;
use async_trait::async_trait;
use carebook_core::{
    escape_query_text, validate_identifier, CarebookError, CarebookResult, Patient,
    PatientFilter, PatientId,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime, Document};
use mongodb::options::ReturnDocument;
use std::sync::Arc;
use tracing::{debug, info};

/// MongoDB patient repository implementation.
#[derive(Clone)]
pub struct MongoPatientRepository {
    connection: Arc<MongoConnection>,
}

impl MongoPatientRepository {
    /// Creates a new MongoDB patient repository.
    #[must_use]
    pub fn new(connection: Arc<MongoConnection>) -> Self {
        Self { connection }
    }
}

/// Builds the query document for a name filter.
///
/// The fragment is regex-escaped, so `.*` matches a literal dot-star.
pub(crate) fn name_query(filter: &PatientFilter) -> CarebookResult<Document> {
    filter.validate()?;
    Ok(match filter.name_fragment() {
        Some(fragment) => doc! {
            "name": { "$regex": escape_query_text(fragment), "$options": "i" }
        },
        None => doc! {},
    })
}

/// Re-checks an identifier right before it is placed in a query.
fn id_query(id: &PatientId) -> CarebookResult<Document> {
    validate_identifier("patient id", id.as_str())?;
    Ok(doc! { "patient_id": id.as_str() })
}

#[async_trait]
impl PatientRepository for MongoPatientRepository {
    async fn list(
        &self,
        filter: &PatientFilter,
        limit: u32,
        offset: u64,
    ) -> CarebookResult<Vec<Patient>> {
        debug!(limit, offset, "Listing patients");

        let documents: Vec<PatientDocument> = self
            .connection
            .patients()
            .find(name_query(filter)?)
            .sort(doc! { "created_at": -1, "patient_id": 1 })
            .skip(offset)
            .limit(i64::from(limit))
            .await?
            .try_collect()
            .await?;

        Ok(documents.into_iter().map(Patient::from).collect())
    }

    async fn find_by_id(&self, id: &PatientId) -> CarebookResult<Patient> {
        debug!("Finding patient by id: {}", id);

        self.connection
            .patients()
            .find_one(id_query(id)?)
            .await?
            .map(Patient::from)
            .ok_or_else(|| CarebookError::not_found("Patient", id))
    }

    async fn create(&self, patient: &Patient) -> CarebookResult<Patient> {
        let query = id_query(&patient.id)?;
        patient.validate()?;

        // The unique indexes catch races; these lookups give precise
        // messages and cover deployments that skip index bootstrap.
        let patients = self.connection.patients();
        if patients.find_one(query).await?.is_some() {
            return Err(CarebookError::conflict(format!(
                "patient {} already exists",
                patient.id
            )));
        }
        if patients
            .find_one(doc! { "phone": patient.phone.as_str() })
            .await?
            .is_some()
        {
            return Err(CarebookError::conflict("phone already registered"));
        }

        patients.insert_one(PatientDocument::from(patient)).await?;
        info!("Created patient: {}", patient.id);
        Ok(patient.clone())
    }

    async fn update(&self, id: &PatientId, changes: &Patient) -> CarebookResult<Patient> {
        let query = id_query(id)?;
        changes.validate()?;

        let patients = self.connection.patients();
        if patients.find_one(query.clone()).await?.is_none() {
            return Err(CarebookError::not_found("Patient", id));
        }

        let phone_taken = patients
            .find_one(doc! {
                "phone": changes.phone.as_str(),
                "patient_id": { "$ne": id.as_str() },
            })
            .await?
            .is_some();
        if phone_taken {
            return Err(CarebookError::conflict("phone already registered"));
        }

        let update = doc! {
            "$set": {
                "name": changes.name.as_str(),
                "date_of_birth": changes.date_of_birth.to_string(),
                "phone": changes.phone.as_str(),
                "state": changes.state.as_str(),
                "edited_by": changes.edited_by.as_deref(),
                "edited_at": changes.edited_at.map(DateTime::from_chrono),
            }
        };

        let updated = patients
            .find_one_and_update(query, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| CarebookError::not_found("Patient", id))?;

        info!("Updated patient: {}", id);
        Ok(updated.into())
    }

    async fn count(&self, filter: &PatientFilter) -> CarebookResult<u64> {
        let count = self
            .connection
            .patients()
            .count_documents(name_query(filter)?)
            .await?;
        Ok(count)
    }
}
