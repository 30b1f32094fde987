//! Stored document shapes.
//!
//! Timestamps are BSON datetimes so they sort server-side; identifiers are
//! plain strings. The driver-assigned `_id` is never read.

use carebook_core::{Address, AddressId, Patient, PatientId};
use chrono::NaiveDate;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PatientDocument {
    pub patient_id: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub state: String,
    pub created_at: DateTime,
    #[serde(default)]
    pub edited_by: Option<String>,
    #[serde(default)]
    pub edited_at: Option<DateTime>,
}

impl From<&Patient> for PatientDocument {
    fn from(patient: &Patient) -> Self {
        Self {
            patient_id: patient.id.to_string(),
            name: patient.name.clone(),
            date_of_birth: patient.date_of_birth,
            phone: patient.phone.clone(),
            state: patient.state.clone(),
            created_at: DateTime::from_chrono(patient.created_at),
            edited_by: patient.edited_by.clone(),
            edited_at: patient.edited_at.map(DateTime::from_chrono),
        }
    }
}

impl From<PatientDocument> for Patient {
    fn from(doc: PatientDocument) -> Self {
        Self {
            id: PatientId::new_unchecked(doc.patient_id),
            name: doc.name,
            date_of_birth: doc.date_of_birth,
            phone: doc.phone,
            state: doc.state,
            created_at: doc.created_at.to_chrono(),
            edited_by: doc.edited_by,
            edited_at: doc.edited_at.map(DateTime::to_chrono),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AddressDocument {
    pub address_id: String,
    pub patient_id: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl From<AddressDocument> for Address {
    fn from(doc: AddressDocument) -> Self {
        Self {
            id: AddressId::new_unchecked(doc.address_id),
            patient_id: PatientId::new_unchecked(doc.patient_id),
            line1: doc.line1,
            line2: doc.line2,
            city: doc.city,
            state: doc.state,
            zip: doc.zip,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebook_core::now_millis;

    #[test]
    fn test_patient_document_preserves_fields() {
        let mut patient = Patient::new(
            PatientId::parse("P100").unwrap(),
            "Ada",
            NaiveDate::from_ymd_opt(1980, 4, 2).unwrap(),
            "5551112222",
            "CA",
        )
        .unwrap();
        patient.edited_by = Some("nurse-1".to_string());
        patient.edited_at = Some(now_millis());

        let stored = mongodb::bson::to_document(&PatientDocument::from(&patient)).unwrap();
        assert_eq!(stored.get_str("date_of_birth").unwrap(), "1980-04-02");
        assert!(stored.get_datetime("created_at").is_ok());

        let doc: PatientDocument = mongodb::bson::from_document(stored).unwrap();
        assert_eq!(Patient::from(doc), patient);
    }
}
